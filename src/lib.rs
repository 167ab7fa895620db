// Crate-level lints
#![allow(clippy::cast_possible_truncation)] // u128/u32 -> u64/i32 for durations and pixel math
#![allow(clippy::cast_precision_loss)] // u32 -> f32 in render statistics
#![allow(clippy::cast_possible_wrap)] // panel dimensions fit in i32
#![allow(clippy::cast_sign_loss)]

//! Rotating widget scheduler for LED matrix information panels.
//!
//! The panel shows one widget at a time and rotates through the configured
//! widgets on a fixed schedule. Every widget keeps its content fresh in the
//! background, whether or not it is on screen, and asks for a redraw when
//! something visible changed.
//!
//! # Architecture
//!
//! ```text
//! config.toml ──> Config ──> Scheduler ──tick──> WidgetHost ──render──> LedPanel (Surface)
//!                               │                    │
//!                               │                    └── Activities (threads) ──> RenderRequest
//!                               └── Rotation (which slot, until when)
//! ```
//!
//! - [`config`]: figment-based configuration loading and validation
//! - [`scheduler`]: Rotation timing, render coalescing and the tick loop
//! - [`widget`]: The [`widget::Widget`] trait, lifecycle host, activities and
//!   the built-in widgets
//! - [`hafas`]: Transit departures from the BVG HAFAS service
//! - [`panel`]: The [`infopanel_common::Surface`] implementation on the
//!   embedded-graphics simulator
//!
//! Text layout, fonts and the surface traits live in the `infopanel-common`
//! crate so they stay free of `std`.

pub mod cancel;
pub mod config;
pub mod error;
pub mod hafas;
pub mod panel;
pub mod scheduler;
pub mod stats;
pub mod timing;
pub mod widget;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{ConfigError, FetchError, RenderError, SchedulerError, WidgetError};
pub use panel::LedPanel;
pub use scheduler::Scheduler;
