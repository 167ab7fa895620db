//! Panel fonts and their glyph metrics.
//!
//! The panel only knows two faces, selected by name in widget parameters:
//!
//! | Name        | Face            |
//! |-------------|-----------------|
//! | `"regular"` | `FONT_5X8`      |
//! | `"bold"`    | `ProFont` 7pt   |
//!
//! Both are monospaced, so every character has the same advance. Metrics are
//! still queried per character so the layout engine works unchanged with a
//! proportional surface.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::FONT_5X8;
use profont::PROFONT_7_POINT;

/// A font face available on the panel.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Font {
    /// Default body text.
    #[default]
    Regular,

    /// Emphasised text (line names, headings).
    Bold,
}

impl Font {
    /// Look up a font by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "regular" => Some(Self::Regular),
            "bold" => Some(Self::Bold),
            _ => None,
        }
    }

    /// Configuration name of this font.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
        }
    }

    /// The `embedded-graphics` face backing this font.
    #[inline]
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            Self::Regular => &FONT_5X8,
            Self::Bold => &PROFONT_7_POINT,
        }
    }

    /// Horizontal advance of one glyph, including inter-glyph spacing.
    #[inline]
    pub fn advance(self) -> i32 {
        let font = self.mono();
        (font.character_size.width + font.character_spacing) as i32
    }

    /// Height of one text line in pixels.
    #[inline]
    pub fn line_height(self) -> i32 { self.mono().character_size.height as i32 }

    /// Distance from the top of a line to its baseline.
    #[inline]
    pub fn baseline(self) -> i32 { self.mono().baseline as i32 }
}
