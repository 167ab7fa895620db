//! Background activities owned by a widget.
//!
//! Activities are registered while the widget is idle, launched together by
//! [`Activities::start`] and stopped cooperatively by [`Activities::stop`]:
//! the shared cancellation token is cancelled, then every thread gets a grace
//! period to return. Threads that overrun it are detached and left to finish
//! on their own; forcibly killing arbitrary work is never safe.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{ActivityContext, RenderRequest};
use crate::cancel::CancellationToken;
use crate::error::WidgetError;
use crate::timing::ACTIVITY_GRACE_PERIOD;

type ActivityFn = Box<dyn FnOnce(ActivityContext) + Send + 'static>;

struct Pending {
    name: String,
    run: ActivityFn,
}

struct Running {
    name: String,
    handle: JoinHandle<()>,
}

/// Reports the end of an activity thread, including unwinding from a panic.
struct Finished {
    tx: Sender<()>,
}

impl Drop for Finished {
    fn drop(&mut self) { self.tx.send(()).ok(); }
}

/// Registry and runtime of one widget's background activities.
pub struct Activities {
    owner: String,
    pending: Vec<Pending>,
    running: Vec<Running>,
    finished_rx: Option<Receiver<()>>,
    token: CancellationToken,
    render: RenderRequest,
    is_running: bool,
}

impl Activities {
    pub(crate) fn new(
        owner: impl Into<String>,
        render: RenderRequest,
    ) -> Self {
        Self {
            owner: owner.into(),
            pending: Vec::new(),
            running: Vec::new(),
            finished_rx: None,
            token: CancellationToken::new(),
            render,
            is_running: false,
        }
    }

    /// Register an activity to be launched by [`Activities::start`].
    ///
    /// Fails with [`WidgetError::AlreadyRunning`] once the activities run.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        activity: F,
    ) -> Result<(), WidgetError>
    where
        F: FnOnce(ActivityContext) + Send + 'static,
    {
        if self.is_running {
            return Err(WidgetError::AlreadyRunning);
        }
        self.pending.push(Pending {
            name: name.into(),
            run: Box::new(activity),
        });
        Ok(())
    }

    /// Render request of the owning widget.
    pub fn render_request(&self) -> RenderRequest { self.render.clone() }

    #[inline]
    pub const fn is_running(&self) -> bool { self.is_running }

    /// Number of registered activities that have not been launched yet.
    #[inline]
    pub fn pending(&self) -> usize { self.pending.len() }

    /// Launch every registered activity on its own thread.
    pub fn start(&mut self) -> Result<(), WidgetError> {
        if self.is_running {
            return Ok(());
        }
        self.is_running = true;

        let (tx, rx) = mpsc::channel();
        self.finished_rx = Some(rx);

        for Pending { name, run } in std::mem::take(&mut self.pending) {
            let ctx = ActivityContext::new(self.token.clone(), self.render.clone());
            let finished = Finished { tx: tx.clone() };
            let handle = thread::Builder::new()
                .name(format!("{}:{}", self.owner, name))
                .spawn(move || {
                    let _finished = finished;
                    run(ctx);
                });

            match handle {
                Ok(handle) => {
                    tracing::debug!(widget = %self.owner, activity = %name, "Activity started");
                    self.running.push(Running { name, handle });
                }
                Err(err) => {
                    // Already launched threads must not outlive a failed start.
                    self.stop(ACTIVITY_GRACE_PERIOD);
                    return Err(WidgetError::Spawn(err));
                }
            }
        }

        Ok(())
    }

    /// Cancel all activities and wait up to `grace` for them to exit.
    pub fn stop(
        &mut self,
        grace: Duration,
    ) {
        if !self.is_running {
            return;
        }
        self.is_running = false;
        self.token.cancel();

        let deadline = Instant::now() + grace;
        let mut outstanding = self.running.len();
        if let Some(rx) = self.finished_rx.take() {
            while outstanding > 0 {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(()) => outstanding -= 1,
                    Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        // Every thread signalled its exit, so joining cannot block for long.
        let all_finished = outstanding == 0;
        for Running { name, handle } in self.running.drain(..) {
            if all_finished || handle.is_finished() {
                if handle.join().is_err() {
                    tracing::warn!(widget = %self.owner, activity = %name, "Activity panicked");
                } else {
                    tracing::debug!(widget = %self.owner, activity = %name, "Activity stopped");
                }
            } else {
                tracing::warn!(
                    widget = %self.owner,
                    activity = %name,
                    grace_ms = grace.as_millis() as u64,
                    "Activity did not stop within the grace period, abandoning it"
                );
            }
        }
    }
}

impl Drop for Activities {
    fn drop(&mut self) { self.token.cancel(); }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn activities() -> Activities { Activities::new("test", RenderRequest::new()) }

    #[test]
    fn test_register_before_start() {
        let mut activities = activities();
        activities.register("a", |_| {}).unwrap();
        activities.register("b", |_| {}).unwrap();
        assert_eq!(activities.pending(), 2);
        assert!(!activities.is_running());
    }

    #[test]
    fn test_register_while_running_fails() {
        let mut activities = activities();
        activities.start().unwrap();
        let err = activities.register("late", |_| {}).unwrap_err();
        assert!(matches!(err, WidgetError::AlreadyRunning), "got {err:?}");
        activities.stop(Duration::from_secs(1));
    }

    #[test]
    fn test_start_runs_every_activity() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut activities = activities();
        for name in ["one", "two", "three"] {
            let runs = Arc::clone(&runs);
            activities
                .register(name, move |_| {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        activities.start().unwrap();
        activities.stop(Duration::from_secs(5));

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(activities.pending(), 0, "Activities are consumed by start");
    }

    #[test]
    fn test_stop_cancels_looping_activity() {
        let cycles = Arc::new(AtomicUsize::new(0));
        let mut activities = activities();
        {
            let cycles = Arc::clone(&cycles);
            activities
                .register("loop", move |ctx| {
                    while ctx.sleep(Duration::from_millis(5)) {
                        cycles.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .unwrap();
        }

        activities.start().unwrap();
        thread::sleep(Duration::from_millis(30));

        let start = Instant::now();
        activities.stop(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1), "Cooperative stop is prompt");
        assert!(!activities.is_running());

        let after_stop = cycles.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(cycles.load(Ordering::SeqCst), after_stop, "No cycles after stop");
    }

    #[test]
    fn test_stop_abandons_activity_after_grace_period() {
        let mut activities = activities();
        activities
            .register("stubborn", |_ctx| {
                // ignores cancellation
                thread::sleep(Duration::from_millis(500));
            })
            .unwrap();

        activities.start().unwrap();
        let start = Instant::now();
        activities.stop(Duration::from_millis(50));
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(50), "Stop waits for the grace period");
        assert!(elapsed < Duration::from_millis(400), "Stop does not wait for the stubborn activity");
    }

    #[test]
    fn test_activity_can_request_render() {
        let render = RenderRequest::new();
        let mut activities = Activities::new("test", render.clone());
        activities.register("notify", |ctx| ctx.request_render()).unwrap();

        activities.start().unwrap();
        activities.stop(Duration::from_secs(5));

        assert!(render.is_raised());
    }

    #[test]
    fn test_panicking_activity_does_not_block_stop() {
        let mut activities = activities();
        activities.register("boom", |_| panic!("activity failure")).unwrap();

        activities.start().unwrap();
        let start = Instant::now();
        activities.stop(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1), "Panicked activity counts as finished");
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut activities = activities();
        activities.stop(Duration::from_secs(5));
        assert!(!activities.is_running());
    }
}
