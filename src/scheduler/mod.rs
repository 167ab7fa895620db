//! Widget rotation and the render loop.
//!
//! The scheduler owns every configured widget for the whole run. At startup
//! all widgets are set up and their background activities started, so a
//! widget's data is already fresh when its slot comes around. Only the active
//! widget is rendered, and only when its render request is raised.
//!
//! # Tick
//!
//! 1. Rotate if the active slot expired (hide outgoing, show incoming, raise
//!    the incoming render request).
//! 2. If the active widget requested a render: draw it, swap the surface.
//! 3. Sleep until the next tick or the slot expiry, whichever comes first.
//!
//! # Shutdown
//!
//! [`Scheduler::shutdown`] stops and tears down every widget exactly once, in
//! configuration order. `run` always calls it, whichever way the loop exits,
//! and `Drop` calls it again for unwinding panics; repeated calls are no-ops.

mod rotation;

use std::time::{Duration, Instant};

use infopanel_common::Surface;
pub use rotation::{Advance, Rotation};

use crate::cancel::CancellationToken;
use crate::config::SchedulerConfig;
use crate::error::{ConfigError, SchedulerError};
use crate::stats::RenderStats;
use crate::widget::{WidgetHost, build_widget};

pub struct Scheduler {
    slots: Vec<WidgetHost>,
    rotation: Rotation,
    update_rate: Duration,
    shutdown: CancellationToken,
    last_render: Option<Instant>,
    stats: RenderStats,
    started: bool,
    shut_down: bool,
}

impl Scheduler {
    /// Scheduler over `widgets` in rotation order, each with its time on screen.
    pub fn new(
        widgets: Vec<(WidgetHost, Duration)>,
        update_rate: Duration,
    ) -> Result<Self, ConfigError> {
        if widgets.is_empty() {
            return Err(ConfigError::NoWidgets);
        }
        let (slots, durations) = widgets.into_iter().unzip();
        Ok(Self {
            slots,
            rotation: Rotation::new(durations),
            update_rate,
            shutdown: CancellationToken::new(),
            last_render: None,
            stats: RenderStats::new(Instant::now()),
            started: false,
            shut_down: false,
        })
    }

    /// Build every configured widget through the registry.
    pub fn from_config(config: &SchedulerConfig) -> Result<Self, ConfigError> {
        let update_rate = config.update_rate()?;
        let widgets = config
            .widgets
            .iter()
            .enumerate()
            .map(|(index, spec)| -> Result<_, ConfigError> {
                let duration = spec.duration(index)?;
                Ok((WidgetHost::new(spec.kind.clone(), build_widget(spec)?), duration))
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(count = widgets.len(), "Widgets created");
        Self::new(widgets, update_rate)
    }

    /// Token that ends [`Scheduler::run`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken { self.shutdown.clone() }

    /// Index of the widget on screen, `None` before the first tick.
    #[inline]
    pub const fn active_index(&self) -> Option<usize> { self.rotation.current() }

    #[inline]
    pub fn len(&self) -> usize { self.slots.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    #[inline]
    pub const fn stats(&self) -> &RenderStats { &self.stats }

    #[inline]
    pub fn widget(
        &self,
        index: usize,
    ) -> Option<&WidgetHost> {
        self.slots.get(index)
    }

    /// Set up every widget, then start their activities.
    ///
    /// On failure every widget is shut down before the error is returned.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        let result = self.start_widgets();
        if result.is_err() {
            self.shutdown();
        }
        result
    }

    fn start_widgets(&mut self) -> Result<(), SchedulerError> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.setup().map_err(|source| SchedulerError::Setup {
                index,
                kind: slot.kind().to_string(),
                source,
            })?;
        }
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.start().map_err(|source| SchedulerError::Start {
                index,
                kind: slot.kind().to_string(),
                source,
            })?;
        }
        tracing::info!(count = self.slots.len(), "Widgets started");
        Ok(())
    }

    /// Run one scheduler step at `now`.
    ///
    /// Starts the widgets on first use. A render failure shuts every widget
    /// down before it is returned.
    pub fn tick(
        &mut self,
        surface: &mut dyn Surface,
        now: Instant,
    ) -> Result<(), SchedulerError> {
        if self.shut_down {
            return Ok(());
        }
        self.start()?;
        self.stats.record_tick();

        self.rotate(now);

        if let Some(index) = self.rotation.current() {
            let slot = &mut self.slots[index];
            if slot.take_render_request() {
                let delta = self.last_render.map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
                let render_start = Instant::now();

                if let Err(source) = slot.render(surface, delta) {
                    slot.request_render();
                    let err = SchedulerError::Render {
                        index,
                        kind: slot.kind().to_string(),
                        source,
                    };
                    self.shutdown();
                    return Err(err);
                }

                surface.swap();
                self.last_render = Some(now);
                self.stats.record_render(render_start.elapsed());
                tracing::trace!(widget = %slot.kind(), delta_ms = delta.as_millis() as u64, "Rendered");
            }
        }

        surface.poll();
        self.stats.maybe_log(now);
        Ok(())
    }

    fn rotate(
        &mut self,
        now: Instant,
    ) {
        match self.rotation.advance(now) {
            Advance::Pending => {}
            Advance::Extended => {
                tracing::trace!("Single widget configured, extending its slot");
            }
            Advance::Switched { from, to } => {
                if let Some(from) = from {
                    self.slots[from].hide();
                }
                let slot = &mut self.slots[to];
                tracing::info!(index = to, widget = %slot.kind(), "Switching widget");
                slot.show();
                slot.request_render();
                self.last_render = Some(now);
                self.stats.record_rotation();
            }
        }
    }

    /// Start the widgets and tick until the shutdown token is cancelled or a
    /// widget fails. Widgets are always shut down before this returns.
    pub fn run(
        &mut self,
        surface: &mut dyn Surface,
    ) -> Result<(), SchedulerError> {
        tracing::info!(
            widgets = self.slots.len(),
            update_rate_ms = self.update_rate.as_millis() as u64,
            "Starting scheduler"
        );
        let result = self.run_loop(surface);
        self.shutdown();
        result
    }

    fn run_loop(
        &mut self,
        surface: &mut dyn Surface,
    ) -> Result<(), SchedulerError> {
        self.start()?;

        while !self.shutdown.is_cancelled() {
            let tick_start = Instant::now();
            self.tick(surface, tick_start)?;

            let wake_at = [tick_start.checked_add(self.update_rate), self.rotation.expires_at()]
                .into_iter()
                .flatten()
                .min();
            let remaining = wake_at.map_or(self.update_rate, |at| at.saturating_duration_since(Instant::now()));
            if !remaining.is_zero() && !self.shutdown.wait_timeout(remaining) {
                break;
            }
        }

        tracing::info!("Shutdown requested");
        Ok(())
    }

    /// Stop and tear down every widget. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.shutdown.cancel();

        tracing::info!("Stopping widgets");
        for slot in &mut self.slots {
            slot.stop();
            slot.teardown();
        }
        self.stats.log(Instant::now());
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) { self.shutdown(); }
}

// =============================================================================
// Tests
// =============================================================================
