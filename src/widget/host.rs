//! Lifecycle driver for a single widget.

use std::time::Duration;

use infopanel_common::Surface;

use super::{Activities, RenderRequest, Widget};
use crate::error::{RenderError, WidgetError};
use crate::timing::ACTIVITY_GRACE_PERIOD;

/// Lifecycle position of a hosted widget.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Constructed,
    Ready,
    Running,
    Stopped,
    TornDown,
}

/// A widget together with its background activities and render request.
///
/// The host enforces the lifecycle order. Out-of-order calls are logged and
/// ignored, so the scheduler can unconditionally stop and tear down every
/// slot on shutdown no matter how far startup got.
pub struct WidgetHost {
    kind: String,
    widget: Box<dyn Widget>,
    activities: Activities,
    render: RenderRequest,
    phase: Phase,
    visible: bool,
}

impl WidgetHost {
    pub fn new(
        kind: impl Into<String>,
        widget: Box<dyn Widget>,
    ) -> Self {
        let kind = kind.into();
        let render = RenderRequest::new();
        Self {
            activities: Activities::new(kind.clone(), render.clone()),
            kind,
            widget,
            render,
            phase: Phase::Constructed,
            visible: false,
        }
    }

    /// Registered type name of the widget.
    #[inline]
    pub fn kind(&self) -> &str { &self.kind }

    #[inline]
    pub const fn phase(&self) -> Phase { self.phase }

    #[inline]
    pub const fn is_visible(&self) -> bool { self.visible }

    /// Run the widget's setup, letting it register activities.
    pub fn setup(&mut self) -> Result<(), WidgetError> {
        if self.phase != Phase::Constructed {
            tracing::warn!(widget = %self.kind, phase = ?self.phase, "Ignoring repeated setup");
            return Ok(());
        }
        tracing::debug!(widget = %self.kind, "Setting up widget");
        self.widget.setup(&mut self.activities)?;
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Launch the widget's background activities.
    pub fn start(&mut self) -> Result<(), WidgetError> {
        if self.phase != Phase::Ready {
            tracing::warn!(widget = %self.kind, phase = ?self.phase, "Ignoring start outside the ready phase");
            return Ok(());
        }
        self.activities.start()?;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Stop background activities, waiting at most the default grace period.
    pub fn stop(&mut self) { self.stop_with_grace(ACTIVITY_GRACE_PERIOD); }

    pub fn stop_with_grace(
        &mut self,
        grace: Duration,
    ) {
        if self.phase != Phase::Running {
            return;
        }
        tracing::debug!(widget = %self.kind, "Stopping widget");
        self.activities.stop(grace);
        self.visible = false;
        self.phase = Phase::Stopped;
    }

    /// Release the widget's resources. Runs at most once.
    pub fn teardown(&mut self) {
        match self.phase {
            Phase::TornDown => return,
            Phase::Running => self.stop(),
            _ => {}
        }
        tracing::debug!(widget = %self.kind, "Tearing down widget");
        self.widget.teardown();
        self.phase = Phase::TornDown;
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.widget.show();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.widget.hide();
    }

    #[inline]
    pub fn request_render(&self) { self.render.raise(); }

    #[inline]
    pub fn render_requested(&self) -> bool { self.render.is_raised() }

    #[inline]
    pub fn clear_render_request(&self) { self.render.clear(); }

    /// Consume a pending render request.
    #[inline]
    pub fn take_render_request(&self) -> bool { self.render.take() }

    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        delta: Duration,
    ) -> Result<(), RenderError> {
        self.widget.render(surface, delta)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, ProbeWidget};

    #[test]
    fn test_full_lifecycle() {
        let (widget, events) = ProbeWidget::new();
        let mut host = WidgetHost::new("probe", Box::new(widget));
        assert_eq!(host.phase(), Phase::Constructed);

        host.setup().unwrap();
        assert_eq!(host.phase(), Phase::Ready);
        host.start().unwrap();
        assert_eq!(host.phase(), Phase::Running);
        host.show();
        assert!(host.is_visible());
        host.hide();
        host.stop();
        assert_eq!(host.phase(), Phase::Stopped);
        host.teardown();
        assert_eq!(host.phase(), Phase::TornDown);

        assert_eq!(events.take(), [Event::Setup, Event::Show, Event::Hide, Event::Teardown]);
    }

    #[test]
    fn test_teardown_runs_once() {
        let (widget, events) = ProbeWidget::new();
        let mut host = WidgetHost::new("probe", Box::new(widget));
        host.setup().unwrap();
        host.teardown();
        host.teardown();
        assert_eq!(events.take(), [Event::Setup, Event::Teardown]);
    }

    #[test]
    fn test_teardown_stops_running_widget() {
        let (widget, _events) = ProbeWidget::new();
        let mut host = WidgetHost::new("probe", Box::new(widget));
        host.setup().unwrap();
        host.start().unwrap();
        host.teardown();
        assert_eq!(host.phase(), Phase::TornDown);
    }

    #[test]
    fn test_start_before_setup_is_ignored() {
        let (widget, _events) = ProbeWidget::new();
        let mut host = WidgetHost::new("probe", Box::new(widget));
        host.start().unwrap();
        assert_eq!(host.phase(), Phase::Constructed);
    }

    #[test]
    fn test_setup_error_keeps_widget_constructed() {
        let (widget, _events) = ProbeWidget::failing_setup();
        let mut host = WidgetHost::new("probe", Box::new(widget));
        assert!(host.setup().is_err());
        assert_eq!(host.phase(), Phase::Constructed);
    }

    #[test]
    fn test_render_request_round_trip() {
        let (widget, _events) = ProbeWidget::new();
        let host = WidgetHost::new("probe", Box::new(widget));
        assert!(!host.render_requested());
        host.request_render();
        assert!(host.render_requested());
        host.clear_render_request();
        assert!(!host.take_render_request());
    }
}
