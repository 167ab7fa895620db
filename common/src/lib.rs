//! Shared building blocks for the infopanel display scheduler.
//!
//! This crate holds the platform-agnostic pieces that widgets and the display
//! backend agree on:
//!
//! - [`colors`]: RGB888 colour constants for the panel
//! - [`fonts`]: The panel's font faces and their glyph metrics
//! - [`surface`]: The [`Surface`] and [`TextMetrics`] traits every backend implements
//! - [`layout`]: Text measuring, truncation and alignment
//!
//! # no_std Compatibility
//!
//! Nothing here allocates or touches the operating system, so the crate builds
//! as `no_std`. Tests run with `std` for the test harness.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod colors;
pub mod fonts;
pub mod layout;
pub mod surface;

// Re-export commonly used items
pub use fonts::Font;
pub use layout::{DrawInstruction, HAlign, TextOptions, VAlign, draw_text, layout, measure};
pub use surface::{MonoMetrics, Surface, TextMetrics};
