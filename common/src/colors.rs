//! Colour constants for the LED panel.
//!
//! The panel is driven in 24-bit RGB (`Rgb888`), so the named colours from the
//! `RgbColor` trait are used where they exist and custom ones are spelled out.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Unlit pixel. Used to clear the back buffer between frames.
pub const BLACK: Rgb888 = Rgb888::BLACK;

/// Default text colour.
pub const WHITE: Rgb888 = Rgb888::WHITE;

// =============================================================================
// Custom Colors (application-specific)
// =============================================================================

/// Departure board amber, close to the colour of platform displays.
pub const ORANGE: Rgb888 = Rgb888::new(255, 128, 0);

/// Build a colour from a configuration triple.
#[inline]
pub const fn from_rgb(rgb: [u8; 3]) -> Rgb888 { Rgb888::new(rgb[0], rgb[1], rgb[2]) }

/// Configuration triple of a colour.
#[inline]
pub fn to_rgb(color: Rgb888) -> [u8; 3] { [color.r(), color.g(), color.b()] }
