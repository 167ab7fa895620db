//! Render statistics for the scheduler loop.
//!
//! Counts ticks, renders and rotations and keeps an exponential moving average
//! of render time. The scheduler logs a summary at `debug` level every
//! [`STATS_LOG_INTERVAL`] and once more at shutdown.

use std::time::{Duration, Instant};

use crate::timing::STATS_LOG_INTERVAL;

pub struct RenderStats {
    /// Scheduler ticks since startup.
    pub ticks: u64,
    /// Frames drawn and presented.
    pub renders: u64,
    /// Slot changes.
    pub rotations: u64,

    /// Most recent render.
    pub render_time_us: u32,
    /// Fastest render observed.
    pub render_time_min_us: u32,
    /// Slowest render observed.
    pub render_time_max_us: u32,
    render_time_avg_us: f32,

    start_time: Instant,
    last_log: Instant,
}

impl RenderStats {
    /// Exponential moving average alpha (0.1 for smooth updates).
    const EMA_ALPHA: f32 = 0.1;

    pub fn new(now: Instant) -> Self {
        Self {
            ticks: 0,
            renders: 0,
            rotations: 0,
            render_time_us: 0,
            render_time_min_us: u32::MAX,
            render_time_max_us: 0,
            render_time_avg_us: 0.0,
            start_time: now,
            last_log: now,
        }
    }

    #[inline]
    pub const fn record_tick(&mut self) { self.ticks += 1; }

    #[inline]
    pub const fn record_rotation(&mut self) { self.rotations += 1; }

    /// Record the duration of one render (draw + present).
    pub fn record_render(
        &mut self,
        render_time: Duration,
    ) {
        let render_us = render_time.as_micros().min(u128::from(u32::MAX)) as u32;

        self.render_time_us = render_us;
        self.render_time_min_us = self.render_time_min_us.min(render_us);
        self.render_time_max_us = self.render_time_max_us.max(render_us);
        if self.renders == 0 {
            self.render_time_avg_us = render_us as f32;
        } else {
            self.render_time_avg_us =
                Self::EMA_ALPHA.mul_add(render_us as f32, (1.0 - Self::EMA_ALPHA) * self.render_time_avg_us);
        }

        self.renders += 1;
    }

    #[inline]
    pub const fn render_time_avg_us(&self) -> u32 { self.render_time_avg_us as u32 }

    /// Log a summary if the log interval has passed.
    pub fn maybe_log(
        &mut self,
        now: Instant,
    ) {
        if now.saturating_duration_since(self.last_log) >= STATS_LOG_INTERVAL {
            self.log(now);
        }
    }

    /// Log a summary unconditionally.
    pub fn log(
        &mut self,
        now: Instant,
    ) {
        self.last_log = now;
        tracing::debug!(
            uptime_s = now.saturating_duration_since(self.start_time).as_secs(),
            ticks = self.ticks,
            renders = self.renders,
            rotations = self.rotations,
            render_last_us = self.render_time_us,
            render_min_us = self.render_time_min_us,
            render_avg_us = self.render_time_avg_us(),
            render_max_us = self.render_time_max_us,
            "Render statistics"
        );
    }
}
