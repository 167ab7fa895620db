//! Timing constants for the scheduler and widget runtime.

use std::time::Duration;

/// Default interval between scheduler ticks (~30 ticks per second).
pub const DEFAULT_UPDATE_RATE: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// How long a slot stays on screen when its configuration gives no duration.
pub const DEFAULT_SLOT_DURATION: Duration = Duration::from_secs(10);

/// How long `stop()` waits for background activities before abandoning them.
pub const ACTIVITY_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Interval between render statistics log lines.
pub const STATS_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Longest interval accepted from configuration (one week).
pub const MAX_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Convert configured seconds to an interval.
///
/// `None` unless the result is non-zero and at most [`MAX_INTERVAL`]; NaN,
/// infinities, negative values and values below one nanosecond are rejected.
pub fn interval_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|interval| !interval.is_zero() && *interval <= MAX_INTERVAL)
}
