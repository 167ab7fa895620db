//! Widgets: independently updating content modules shown one at a time.
//!
//! A widget implements [`Widget`]: a required [`Widget::render`] and optional
//! lifecycle hooks that default to doing nothing. Slow work (network fetches,
//! disk) never happens in `render`; instead the widget registers background
//! activities during [`Widget::setup`]. Each activity runs on its own thread,
//! updates the widget's snapshot and calls
//! [`ActivityContext::request_render`] when something visible changed.
//!
//! # Lifecycle
//!
//! ```text
//! Constructed --setup--> Ready --start--> Running --stop--> Stopped --teardown--> TornDown
//!                                            |
//!                                      show / hide (any number of times)
//! ```
//!
//! The scheduler drives these transitions through [`WidgetHost`], which owns
//! the widget together with its [`Activities`] and render request flag.

mod activities;
mod departures;
mod host;
mod registry;
mod text;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use infopanel_common::Surface;

pub use activities::Activities;
pub use departures::{DepartureBoard, DepartureBoardParams};
pub use host::{Phase, WidgetHost};
pub use registry::{WIDGET_TYPES, build_widget};
pub use text::{TextParams, TextWidget};

use crate::cancel::CancellationToken;
use crate::error::{RenderError, WidgetError};

/// A unit of content the scheduler can put on the panel.
pub trait Widget: Send {
    /// Allocate resources and register background activities.
    ///
    /// Called once before the widget is first shown. May block.
    fn setup(
        &mut self,
        activities: &mut Activities,
    ) -> Result<(), WidgetError> {
        let _ = activities;
        Ok(())
    }

    /// Release resources. Called once after all activities were stopped.
    fn teardown(&mut self) {}

    /// The widget became the active one.
    fn show(&mut self) {}

    /// The widget is no longer the active one.
    fn hide(&mut self) {}

    /// Draw the current snapshot. Must not block on I/O.
    fn render(
        &mut self,
        surface: &mut dyn Surface,
        delta: Duration,
    ) -> Result<(), RenderError>;
}

// =============================================================================
// Render Request
// =============================================================================

/// Level-triggered "content changed" flag shared between activities and the
/// render loop.
///
/// Raising an already raised request is a no-op, so any number of updates
/// between two frames results in a single render. The render loop consumes the
/// request with [`RenderRequest::take`] *before* drawing: a raise that lands
/// while the frame is being drawn survives and triggers the next frame.
#[derive(Clone, Default, Debug)]
pub struct RenderRequest {
    flag: Arc<AtomicBool>,
}

impl RenderRequest {
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn raise(&self) { self.flag.store(true, Ordering::Release); }

    #[inline]
    pub fn is_raised(&self) -> bool { self.flag.load(Ordering::Acquire) }

    #[inline]
    pub fn clear(&self) { self.flag.store(false, Ordering::Release); }

    /// Clear the request, returning whether it was raised.
    #[inline]
    pub fn take(&self) -> bool { self.flag.swap(false, Ordering::AcqRel) }
}

// =============================================================================
// Activity Context
// =============================================================================

/// Handle passed to every background activity.
#[derive(Clone, Debug)]
pub struct ActivityContext {
    token: CancellationToken,
    render: RenderRequest,
}

impl ActivityContext {
    pub(crate) const fn new(
        token: CancellationToken,
        render: RenderRequest,
    ) -> Self {
        Self { token, render }
    }

    /// Whether the widget is being stopped.
    #[inline]
    pub fn is_cancelled(&self) -> bool { self.token.is_cancelled() }

    /// Wait for the next cycle. Returns `false` once the activity should exit.
    #[inline]
    pub fn sleep(
        &self,
        interval: Duration,
    ) -> bool {
        self.token.wait_timeout(interval)
    }

    /// Ask the scheduler to redraw the widget.
    #[inline]
    pub fn request_render(&self) { self.render.raise(); }
}
