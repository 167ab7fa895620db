//! Cooperative cancellation shared between threads.
//!
//! A [`CancellationToken`] is handed to every background activity and to the
//! scheduler loop. Cancelling it is sticky and wakes every thread currently
//! blocked in [`CancellationToken::wait_timeout`], so activities sleeping
//! between refreshes exit promptly instead of finishing their interval.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Default, Debug)]
struct State {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Cloneable handle to a shared cancellation flag.
#[derive(Clone, Default, Debug)]
pub struct CancellationToken {
    state: Arc<State>,
}

impl CancellationToken {
    pub fn new() -> Self { Self::default() }

    /// Request cancellation and wake all waiters.
    pub fn cancel(&self) {
        let mut cancelled = self.state.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.state.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool { *self.state.cancelled.lock().unwrap_or_else(PoisonError::into_inner) }

    /// Sleep for up to `timeout`.
    ///
    /// Returns `true` if the full timeout elapsed, `false` as soon as the token
    /// is cancelled.
    pub fn wait_timeout(
        &self,
        timeout: Duration,
    ) -> bool {
        // A deadline past the end of the clock means waiting until cancelled.
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = self.state.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let Some(deadline) = deadline else {
                cancelled = self.state.wakeup.wait(cancelled).unwrap_or_else(PoisonError::into_inner);
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            cancelled = self
                .state
                .wakeup
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        false
    }
}
