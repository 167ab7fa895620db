//! Text layout: measuring, truncating and aligning a single line of text.
//!
//! # Measuring
//!
//! The width of a string is the sum of its character advances minus one. The
//! advance of the last character includes the gap to the next glyph, which is
//! never drawn:
//!
//! ```text
//! "AB" with 6px advances:   AAAAA.BBBBB.
//!                           |<-- 11 -->|
//! ```
//!
//! # Truncation
//!
//! When a maximum width is given and exceeded, characters are dropped from the
//! end until the rest fits next to the ellipsis marker. The marker takes the
//! sum of its advances: the gap after the prefix plus its drawn width. The
//! reported width is therefore the width of the drawn concatenation and never
//! exceeds `max_width`:
//!
//! ```text
//! "ABCD..." at max_width 40:   AAAAA.BBBBB.CCCCC.....
//!                              |<- 17 ->| |<-18->|
//! ```
//!
//! If the marker itself does not fit (`max_width <= ellipsis advance`) it is
//! silently left out, so a line never degrades to a bare `"..."`. Dropping
//! every character yields an empty draw.
//!
//! # Alignment
//!
//! | Horizontal | Draw x            | Vertical | Draw y (baseline)  |
//! |------------|-------------------|----------|--------------------|
//! | `Left`     | `x`               | `Top`    | `y + baseline`     |
//! | `Center`   | `x - width / 2`   | `Center` | `y + baseline / 2` |
//! | `Right`    | `x - width`       | `Bottom` | `y`                |
//!
//! Layout never allocates: the result borrows the kept prefix of the input and
//! the ellipsis, and [`DrawInstruction::draw`] issues one draw call for each.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::fonts::Font;
use crate::surface::{Surface, TextMetrics};

/// Marker appended to truncated text unless configured otherwise.
pub const DEFAULT_ELLIPSIS: &str = "...";

/// Horizontal anchor of the layout origin.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of the layout origin.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum VAlign {
    /// Origin is the top of the line.
    #[default]
    Top,
    /// Origin is half a baseline above the baseline.
    Center,
    /// Origin is the baseline itself.
    Bottom,
}

/// How a line of text should be laid out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TextOptions<'a> {
    pub font: Font,
    pub max_width: Option<i32>,
    pub halign: HAlign,
    pub valign: VAlign,
    pub ellipsis: &'a str,
}

impl<'a> TextOptions<'a> {
    /// Left/top aligned, unconstrained text in `font`.
    pub const fn new(font: Font) -> Self {
        Self {
            font,
            max_width: None,
            halign: HAlign::Left,
            valign: VAlign::Top,
            ellipsis: DEFAULT_ELLIPSIS,
        }
    }

    #[must_use]
    pub const fn max_width(
        mut self,
        max_width: i32,
    ) -> Self {
        self.max_width = Some(max_width);
        self
    }

    #[must_use]
    pub const fn halign(
        mut self,
        halign: HAlign,
    ) -> Self {
        self.halign = halign;
        self
    }

    #[must_use]
    pub const fn valign(
        mut self,
        valign: VAlign,
    ) -> Self {
        self.valign = valign;
        self
    }

    #[must_use]
    pub const fn ellipsis(
        mut self,
        ellipsis: &'a str,
    ) -> Self {
        self.ellipsis = ellipsis;
        self
    }
}

impl Default for TextOptions<'_> {
    fn default() -> Self { Self::new(Font::default()) }
}

/// Where and what to draw for one line of text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DrawInstruction<'a> {
    pub font: Font,
    /// Baseline-relative draw position of the first glyph.
    pub origin: Point,
    /// Part of the input that survived truncation.
    pub text: &'a str,
    /// Marker drawn after `text` when it was truncated.
    pub ellipsis: Option<&'a str>,
    /// Horizontal offset of the ellipsis from `origin`.
    pub ellipsis_offset: i32,
    /// Drawn width in pixels.
    pub width: i32,
    /// Drawn height in pixels (the font's line height).
    pub height: i32,
    baseline: i32,
}

impl<'a> DrawInstruction<'a> {
    const fn empty(
        font: Font,
        origin: Point,
    ) -> Self {
        Self {
            font,
            origin,
            text: "",
            ellipsis: None,
            ellipsis_offset: 0,
            width: 0,
            height: 0,
            baseline: 0,
        }
    }

    /// Whether nothing will be drawn.
    #[inline]
    pub const fn is_empty(&self) -> bool { self.text.is_empty() }

    /// Top-left corner of the occupied box.
    #[inline]
    pub const fn top_left(&self) -> Point { Point::new(self.origin.x, self.origin.y - self.baseline) }

    /// Box occupied by the drawn text.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(
            self.top_left(),
            Size::new(self.width.max(0) as u32, self.height.max(0) as u32),
        )
    }

    /// Draw the laid out text onto `surface`.
    pub fn draw<S>(
        &self,
        surface: &mut S,
        color: Rgb888,
    ) where
        S: Surface + ?Sized,
    {
        if self.is_empty() {
            return;
        }
        surface.draw_text(self.font, self.origin, color, self.text);
        if let Some(ellipsis) = self.ellipsis {
            let at = Point::new(self.origin.x + self.ellipsis_offset, self.origin.y);
            surface.draw_text(self.font, at, color, ellipsis);
        }
    }
}

/// Sum of the advances of every character in `text`.
fn advance_sum<M>(
    metrics: &M,
    font: Font,
    text: &str,
) -> i32
where
    M: TextMetrics + ?Sized,
{
    text.chars().map(|ch| metrics.character_advance(font, ch)).sum()
}

/// Drawn width of `text` without truncation. Empty text is zero wide.
pub fn measure<M>(
    metrics: &M,
    font: Font,
    text: &str,
) -> i32
where
    M: TextMetrics + ?Sized,
{
    if text.is_empty() {
        return 0;
    }
    advance_sum(metrics, font, text) - 1
}

/// Lay out `text` at `origin` according to `options`.
pub fn layout<'a, M>(
    metrics: &M,
    text: &'a str,
    origin: Point,
    options: &TextOptions<'a>,
) -> DrawInstruction<'a>
where
    M: TextMetrics + ?Sized,
{
    let font = options.font;
    if text.is_empty() {
        return DrawInstruction::empty(font, origin);
    }

    let mut width = measure(metrics, font, text);
    let mut kept = text.len();
    let mut ellipsis = None;
    let mut ellipsis_offset = 0;

    if let Some(max_width) = options.max_width
        && width > max_width
    {
        let ellipsis_width = advance_sum(metrics, font, options.ellipsis);
        let available = max_width - ellipsis_width;

        for (idx, ch) in text.char_indices().rev() {
            if width <= available {
                break;
            }
            width -= metrics.character_advance(font, ch);
            kept = idx;
        }

        if kept == 0 {
            return DrawInstruction::empty(font, origin);
        }

        // No room for the marker: keep the bare prefix.
        if available > 0 && !options.ellipsis.is_empty() {
            ellipsis = Some(options.ellipsis);
            ellipsis_offset = width + 1;
            width += ellipsis_width;
        }
    }

    let x = match options.halign {
        HAlign::Left => origin.x,
        HAlign::Center => origin.x - width / 2,
        HAlign::Right => origin.x - width,
    };

    let baseline = metrics.baseline(font);
    let y = match options.valign {
        VAlign::Top => origin.y + baseline,
        VAlign::Center => origin.y + baseline / 2,
        VAlign::Bottom => origin.y,
    };

    DrawInstruction {
        font,
        origin: Point::new(x, y),
        text: &text[..kept],
        ellipsis,
        ellipsis_offset,
        width,
        height: metrics.line_height(font),
        baseline,
    }
}

/// Lay out and draw `text` in one step, returning the occupied box.
pub fn draw_text<S>(
    surface: &mut S,
    text: &str,
    origin: Point,
    options: &TextOptions<'_>,
    color: Rgb888,
) -> Rectangle
where
    S: Surface + ?Sized,
{
    let instruction = layout(&*surface, text, origin, options);
    instruction.draw(surface, color);
    instruction.bounds()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::string::{String, ToString};
    use std::vec::Vec;

    use embedded_graphics::pixelcolor::RgbColor;

    use super::*;

    const ADVANCE: i32 = 6;
    const BASELINE: i32 = 6;
    const LINE_HEIGHT: i32 = 8;

    /// Every glyph is 6px wide, except `i` which is 2px.
    #[derive(Default)]
    struct FakeSurface {
        draws: Vec<(Point, String)>,
        swaps: usize,
    }

    impl TextMetrics for FakeSurface {
        fn character_advance(
            &self,
            _font: Font,
            ch: char,
        ) -> i32 {
            if ch == 'i' { 2 } else { ADVANCE }
        }

        fn line_height(
            &self,
            _font: Font,
        ) -> i32 {
            LINE_HEIGHT
        }

        fn baseline(
            &self,
            _font: Font,
        ) -> i32 {
            BASELINE
        }
    }

    impl Surface for FakeSurface {
        fn width(&self) -> i32 { 128 }

        fn height(&self) -> i32 { 64 }

        fn draw_text(
            &mut self,
            _font: Font,
            origin: Point,
            _color: Rgb888,
            text: &str,
        ) {
            self.draws.push((origin, text.to_string()));
        }

        fn swap(&mut self) { self.swaps += 1; }
    }

    fn bottom_left() -> TextOptions<'static> { TextOptions::new(Font::Regular).valign(VAlign::Bottom) }

    // -------------------------------------------------------------------------
    // Measuring
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut surface = FakeSurface::default();
        let origin = Point::new(10, 20);
        let bounds = draw_text(&mut surface, "", origin, &TextOptions::new(Font::Regular), Rgb888::WHITE);

        assert_eq!(bounds.top_left, origin, "Empty text keeps the original origin");
        assert_eq!(bounds.size, Size::zero());
        assert!(surface.draws.is_empty(), "No draw call for empty text");
    }

    #[test]
    fn test_unconstrained_width_is_advance_sum_minus_one() {
        let surface = FakeSurface::default();
        for text in ["A", "AB", "HELLO", "departures to the zoo"] {
            let result = layout(&surface, text, Point::zero(), &bottom_left());
            let expected = text.chars().count() as i32 * ADVANCE - 1;
            assert_eq!(result.width, expected, "Width of {text:?}");
            assert_eq!(result.text, text, "No truncation without max width");
            assert!(result.ellipsis.is_none());
        }
    }

    #[test]
    fn test_width_uses_per_character_advances() {
        let surface = FakeSurface::default();
        let result = layout(&surface, "iii", Point::zero(), &bottom_left());
        assert_eq!(result.width, 5, "3 * 2px - 1");
    }

    #[test]
    fn test_text_that_fits_is_not_truncated() {
        let surface = FakeSurface::default();
        let options = bottom_left().max_width(29);
        let result = layout(&surface, "HELLO", Point::zero(), &options);
        assert_eq!(result.text, "HELLO");
        assert_eq!(result.width, 29);
        assert!(result.ellipsis.is_none());
    }

    // -------------------------------------------------------------------------
    // Truncation
    // -------------------------------------------------------------------------

    #[test]
    fn test_truncated_text_fits_and_ends_with_ellipsis() {
        let surface = FakeSurface::default();
        let text = "Berlin Zoologischer Garten";
        for max_width in [24, 40, 60, 100] {
            let options = bottom_left().max_width(max_width);
            let result = layout(&surface, text, Point::zero(), &options);

            assert!(result.width <= max_width, "Width {} exceeds {max_width}", result.width);
            let drawn_to = result.ellipsis_offset + measure(&surface, Font::Regular, DEFAULT_ELLIPSIS);
            assert_eq!(drawn_to, result.width, "Ellipsis must end at the reported width");
            assert!(text.starts_with(result.text), "Result must be a prefix");
            assert!(result.text.len() < text.len(), "Prefix must be strict");
            assert_eq!(result.ellipsis, Some(DEFAULT_ELLIPSIS));
        }
    }

    #[test]
    fn test_truncation_drops_characters_until_prefix_fits() {
        let surface = FakeSurface::default();
        // ellipsis = 18px of advances, available = 40 - 18 = 22 -> "ABC" (17px) fits, "ABCD" (23px) does not
        let options = bottom_left().max_width(40);
        let result = layout(&surface, "ABCDEFGHIJ", Point::zero(), &options);
        assert_eq!(result.text, "ABC");
        assert_eq!(result.width, 17 + 18);
        assert_eq!(result.ellipsis_offset, 18, "Ellipsis starts one advance after the prefix");
    }

    #[test]
    fn test_hello_with_room_for_only_the_ellipsis_is_empty() {
        let surface = FakeSurface::default();
        let options = bottom_left().max_width(3 * ADVANCE).ellipsis("...");
        let origin = Point::new(7, 9);
        let result = layout(&surface, "HELLO", origin, &options);

        assert!(result.is_empty(), "No prefix fits next to the ellipsis");
        assert_eq!(result.width, 0);
        assert_eq!(result.origin, origin);
        assert!(result.ellipsis.is_none());
    }

    #[test]
    fn test_max_width_below_ellipsis_never_renders_bare_ellipsis() {
        let surface = FakeSurface::default();
        let text = "ABCDEFGH";
        let mut previous_len = usize::MAX;
        // the ellipsis takes 18px of advances, so none of these leave room for it
        for max_width in (0..=18).rev() {
            let options = bottom_left().max_width(max_width);
            let result = layout(&surface, text, Point::zero(), &options);

            assert!(result.ellipsis.is_none(), "No ellipsis at max width {max_width}");
            assert!(result.width <= max_width);
            assert!(result.text.len() <= previous_len, "Prefixes only shrink");
            previous_len = result.text.len();
        }
        assert_eq!(previous_len, 0, "Zero width ends in an empty draw");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let surface = FakeSurface::default();
        let options = bottom_left().max_width(30);
        let result = layout(&surface, "Müggelseedamm", Point::zero(), &options);
        assert_eq!(result.text, "Mü");
        assert_eq!(result.ellipsis, Some("..."));
    }

    #[test]
    fn test_empty_ellipsis_is_not_appended() {
        let surface = FakeSurface::default();
        let options = bottom_left().max_width(17).ellipsis("");
        let result = layout(&surface, "ABCDEFGH", Point::zero(), &options);
        assert_eq!(result.text, "ABC");
        assert_eq!(result.width, 17);
        assert!(result.ellipsis.is_none());
    }

    // -------------------------------------------------------------------------
    // Alignment
    // -------------------------------------------------------------------------

    #[test]
    fn test_horizontal_alignment_shifts() {
        let surface = FakeSurface::default();
        let origin = Point::new(64, 0);
        let width = measure(&surface, Font::Regular, "HELLO");

        let left = layout(&surface, "HELLO", origin, &bottom_left());
        let center = layout(&surface, "HELLO", origin, &bottom_left().halign(HAlign::Center));
        let right = layout(&surface, "HELLO", origin, &bottom_left().halign(HAlign::Right));

        assert_eq!(left.origin.x, 64);
        assert_eq!(center.origin.x, 64 - width / 2);
        assert_eq!(right.origin.x, 64 - width);
    }

    #[test]
    fn test_left_alignment_is_stable_under_relayout() {
        let surface = FakeSurface::default();
        let first = layout(&surface, "HELLO", Point::new(3, 0), &bottom_left());
        let second = layout(&surface, "HELLO", first.origin, &bottom_left());
        assert_eq!(first.origin, second.origin);
    }

    #[test]
    fn test_vertical_alignment_shifts() {
        let surface = FakeSurface::default();
        let origin = Point::new(0, 20);
        let options = TextOptions::new(Font::Regular);

        let top = layout(&surface, "A", origin, &options.valign(VAlign::Top));
        let center = layout(&surface, "A", origin, &options.valign(VAlign::Center));
        let bottom = layout(&surface, "A", origin, &options.valign(VAlign::Bottom));

        assert_eq!(top.origin.y, 20 + BASELINE);
        assert_eq!(center.origin.y, 20 + BASELINE / 2);
        assert_eq!(bottom.origin.y, 20);
    }

    #[test]
    fn test_bounds_start_at_top_of_line() {
        let surface = FakeSurface::default();
        let result = layout(&surface, "AB", Point::new(5, 10), &TextOptions::new(Font::Regular));
        let bounds = result.bounds();
        assert_eq!(bounds.top_left, Point::new(5, 10), "Top alignment keeps the box at the origin");
        assert_eq!(bounds.size, Size::new(11, LINE_HEIGHT as u32));
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    #[test]
    fn test_draw_emits_prefix_then_ellipsis() {
        let mut surface = FakeSurface::default();
        let options = bottom_left().max_width(40);
        draw_text(&mut surface, "ABCDEFGHIJ", Point::new(1, 30), &options, Rgb888::WHITE);

        assert_eq!(
            surface.draws,
            [(Point::new(1, 30), "ABC".to_string()), (Point::new(19, 30), "...".to_string())]
        );
        assert_eq!(surface.swaps, 0, "Layout never swaps");
    }

    #[test]
    fn test_draw_without_truncation_is_single_call() {
        let mut surface = FakeSurface::default();
        draw_text(&mut surface, "U2", Point::new(1, 0), &TextOptions::new(Font::Bold), Rgb888::WHITE);
        assert_eq!(surface.draws, [(Point::new(1, BASELINE), "U2".to_string())]);
    }
}
