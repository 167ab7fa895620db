//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use infopanel_common::{Font, Surface, TextMetrics};

use crate::error::{RenderError, WidgetError};
use crate::widget::{Activities, Widget};

// =============================================================================
// Recording Surface
// =============================================================================

pub const ADVANCE: i32 = 6;
pub const LINE_HEIGHT: i32 = 8;
pub const BASELINE: i32 = 6;

/// 128x64 surface with 6px glyphs that records every draw call.
#[derive(Default)]
pub struct RecordingSurface {
    pub draws: Vec<(Font, Point, String)>,
    pub swaps: usize,
}

impl RecordingSurface {
    pub fn new() -> Self { Self::default() }

    /// Text drawn so far, in draw order.
    pub fn texts(&self) -> Vec<&str> { self.draws.iter().map(|(_, _, text)| text.as_str()).collect() }
}

impl TextMetrics for RecordingSurface {
    fn character_advance(
        &self,
        _font: Font,
        _ch: char,
    ) -> i32 {
        ADVANCE
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

impl Surface for RecordingSurface {
    fn width(&self) -> i32 { 128 }

    fn height(&self) -> i32 { 64 }

    fn draw_text(
        &mut self,
        font: Font,
        origin: Point,
        _color: Rgb888,
        text: &str,
    ) {
        self.draws.push((font, origin, text.to_string()));
    }

    fn swap(&mut self) { self.swaps += 1; }
}

// =============================================================================
// Probe Widget
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
    Setup,
    Show,
    Hide,
    Render,
    Teardown,
}

/// Shared, ordered log of widget callbacks.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<(&'static str, Event)>>>);

impl EventLog {
    pub fn new() -> Self { Self::default() }

    fn push(
        &self,
        name: &'static str,
        event: Event,
    ) {
        self.0.lock().unwrap().push((name, event));
    }

    /// Drain the log, dropping widget names.
    pub fn take(&self) -> Vec<Event> { self.take_named().into_iter().map(|(_, event)| event).collect() }

    /// Drain the log.
    pub fn take_named(&self) -> Vec<(&'static str, Event)> { std::mem::take(&mut *self.0.lock().unwrap()) }

    pub fn count(
        &self,
        event: Event,
    ) -> usize {
        self.0.lock().unwrap().iter().filter(|(_, e)| *e == event).count()
    }
}

/// Widget that records its callbacks and can be told to fail.
pub struct ProbeWidget {
    name: &'static str,
    events: EventLog,
    fail_setup: bool,
    fail_render: bool,
}

impl ProbeWidget {
    pub fn new() -> (Self, EventLog) {
        let events = EventLog::new();
        (Self::with_log("probe", &events), events)
    }

    pub fn with_log(
        name: &'static str,
        events: &EventLog,
    ) -> Self {
        Self {
            name,
            events: events.clone(),
            fail_setup: false,
            fail_render: false,
        }
    }

    pub fn failing_setup() -> (Self, EventLog) {
        let (mut widget, events) = Self::new();
        widget.fail_setup = true;
        (widget, events)
    }

    #[must_use]
    pub const fn fail_render(mut self) -> Self {
        self.fail_render = true;
        self
    }
}

impl Widget for ProbeWidget {
    fn setup(
        &mut self,
        _activities: &mut Activities,
    ) -> Result<(), WidgetError> {
        self.events.push(self.name, Event::Setup);
        if self.fail_setup {
            return Err(WidgetError::LocationNotFound(self.name.to_string()));
        }
        Ok(())
    }

    fn teardown(&mut self) { self.events.push(self.name, Event::Teardown); }

    fn show(&mut self) { self.events.push(self.name, Event::Show); }

    fn hide(&mut self) { self.events.push(self.name, Event::Hide); }

    fn render(
        &mut self,
        surface: &mut dyn Surface,
        _delta: Duration,
    ) -> Result<(), RenderError> {
        self.events.push(self.name, Event::Render);
        if self.fail_render {
            return Err(RenderError::Failed(format!("{} cannot render", self.name)));
        }
        surface.draw_text(Font::Regular, Point::zero(), Rgb888::default(), self.name);
        Ok(())
    }
}
