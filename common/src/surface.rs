//! Drawing interface between widgets and the physical (or emulated) panel.
//!
//! Widgets never see a concrete display type. They receive a `&mut dyn Surface`
//! and draw text through it; the scheduler calls [`Surface::swap`] once the
//! active widget has finished a frame.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::fonts::Font;

/// Glyph metrics queries used by the layout engine.
pub trait TextMetrics {
    /// Horizontal advance of `ch` in `font`, including inter-glyph spacing.
    fn character_advance(
        &self,
        font: Font,
        ch: char,
    ) -> i32;

    /// Height of one line of `font`.
    fn line_height(
        &self,
        font: Font,
    ) -> i32;

    /// Offset from the top of a line of `font` to its baseline.
    fn baseline(
        &self,
        font: Font,
    ) -> i32;
}

/// A fixed-size, double-buffered pixel surface.
pub trait Surface: TextMetrics {
    /// Logical width in pixels.
    fn width(&self) -> i32;

    /// Logical height in pixels.
    fn height(&self) -> i32;

    /// Draw `text` into the back buffer with its baseline at `origin`.
    fn draw_text(
        &mut self,
        font: Font,
        origin: Point,
        color: Rgb888,
        text: &str,
    );

    /// Present the back buffer. The next frame starts from a cleared buffer.
    fn swap(&mut self);

    /// Service the output device between frames (input events, keep-alive).
    ///
    /// Called once per scheduler tick whether or not anything was drawn.
    fn poll(&mut self) {}
}

/// Metrics taken straight from the mono fonts in [`Font`].
///
/// Useful for surfaces that render with `embedded-graphics` mono fonts and for
/// computing layouts without a display.
#[derive(Clone, Copy, Default, Debug)]
pub struct MonoMetrics;

impl TextMetrics for MonoMetrics {
    fn character_advance(
        &self,
        font: Font,
        _ch: char,
    ) -> i32 {
        font.advance()
    }

    fn line_height(
        &self,
        font: Font,
    ) -> i32 {
        font.line_height()
    }

    fn baseline(
        &self,
        font: Font,
    ) -> i32 {
        font.baseline()
    }
}
