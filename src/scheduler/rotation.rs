//! Time-sliced rotation over a fixed list of slots.

use std::time::{Duration, Instant};

/// Outcome of [`Rotation::advance`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    /// The active slot has time left.
    Pending,
    /// The only slot stays active with a fresh expiry.
    Extended,
    /// Another slot became active.
    Switched { from: Option<usize>, to: usize },
}

/// Which slot is active and until when.
///
/// Driven entirely by the instants passed in; holds no clock of its own.
#[derive(Debug)]
pub struct Rotation {
    durations: Vec<Duration>,
    current: Option<usize>,
    expires_at: Option<Instant>,
}

impl Rotation {
    pub const fn new(durations: Vec<Duration>) -> Self {
        Self {
            durations,
            current: None,
            expires_at: None,
        }
    }

    #[inline]
    pub const fn current(&self) -> Option<usize> { self.current }

    #[inline]
    pub const fn expires_at(&self) -> Option<Instant> { self.expires_at }

    #[inline]
    pub fn len(&self) -> usize { self.durations.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.durations.is_empty() }

    /// Whether the active slot has run out (always true before the first slot).
    ///
    /// A slot whose expiry is past the end of the clock never runs out.
    pub fn is_due(
        &self,
        now: Instant,
    ) -> bool {
        match (self.current, self.expires_at) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(expires_at)) => now >= expires_at,
        }
    }

    /// Move on to the next slot if the active one has expired.
    pub fn advance(
        &mut self,
        now: Instant,
    ) -> Advance {
        if self.durations.is_empty() || !self.is_due(now) {
            return Advance::Pending;
        }

        let next = self.current.map_or(0, |current| (current + 1) % self.durations.len());
        self.expires_at = now.checked_add(self.durations[next]);

        if self.current == Some(next) {
            return Advance::Extended;
        }

        let from = self.current.replace(next);
        Advance::Switched { from, to: next }
    }
}
