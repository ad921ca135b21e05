//! Lifecycle manager: start background tasks at boot, drain them at shutdown.
//!
//! States move strictly forward: `Created -> Running -> Draining -> Stopped`.
//! Shutdown is cooperative. `stop` broadcasts cancellation once, then waits
//! on the task tracker for at most the given timeout. A timeout is reported
//! in the returned [`DrainReport`] and logged; it is not an error, and tasks
//! that are still running are left to finish (or die with the runtime).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use parley_types::error::LifecycleError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span};

use super::BackgroundTask;

type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type TaskStarter = Box<dyn FnOnce(CancellationToken) -> TaskFuture + Send>;

/// Position in the manager's linear lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Running,
    Draining,
    Stopped,
}

impl LifecycleState {
    fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Running => "running",
            LifecycleState::Draining => "draining",
            LifecycleState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every task returned before the deadline.
    Drained,
    /// The deadline passed with tasks still running.
    TimedOut { still_running: usize },
}

/// Result of [`LifecycleManager::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub outcome: DrainOutcome,
    pub elapsed: Duration,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.outcome == DrainOutcome::Drained
    }
}

struct PendingTask {
    name: &'static str,
    start: TaskStarter,
}

/// Owns the shared cancellation token and the wait-set of background tasks.
pub struct LifecycleManager {
    state: LifecycleState,
    cancel: CancellationToken,
    tracker: TaskTracker,
    pending: Vec<PendingTask>,
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Created,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// A child of the shared token, cancelled when `stop` is called.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Number of spawned tasks that have not returned yet.
    pub fn running_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Add a task.
    ///
    /// Before `start` the task is queued; while running it is spawned
    /// immediately. Once `stop` has been called no task is accepted.
    pub fn register<T: BackgroundTask>(&mut self, task: T) -> Result<(), LifecycleError> {
        let name = task.name();
        match self.state {
            LifecycleState::Created => {
                self.pending.push(PendingTask {
                    name,
                    start: Box::new(move |cancel| Box::pin(task.run(cancel))),
                });
                Ok(())
            }
            LifecycleState::Running => {
                let fut: TaskFuture = Box::pin(task.run(self.cancel.child_token()));
                self.spawn(name, fut);
                Ok(())
            }
            LifecycleState::Draining | LifecycleState::Stopped => {
                Err(LifecycleError::ShuttingDown)
            }
        }
    }

    /// Move to `Running` and spawn every queued task.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Created {
            return Err(LifecycleError::InvalidTransition {
                from: self.state.as_str(),
                action: "start",
            });
        }
        self.state = LifecycleState::Running;

        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for task in pending {
            let fut = (task.start)(self.cancel.child_token());
            self.spawn(task.name, fut);
        }

        info!(tasks = count, "background tasks started");
        Ok(())
    }

    fn spawn(&self, name: &'static str, fut: TaskFuture) {
        debug!(task = name, "spawning background task");
        self.tracker.spawn(
            async move {
                fut.await;
                debug!("background task returned");
            }
            .instrument(info_span!("background_task", task = name)),
        );
    }

    /// Cancel all tasks and wait up to `timeout` for them to return.
    ///
    /// Always ends in `Stopped`. Calling it from `Created` skips the drain.
    pub async fn stop(&mut self, timeout: Duration) -> Result<DrainReport, LifecycleError> {
        match self.state {
            LifecycleState::Running => {}
            LifecycleState::Created => {
                self.pending.clear();
                self.cancel.cancel();
                self.tracker.close();
                self.state = LifecycleState::Stopped;
                return Ok(DrainReport {
                    outcome: DrainOutcome::Drained,
                    elapsed: Duration::ZERO,
                });
            }
            other => {
                return Err(LifecycleError::InvalidTransition {
                    from: other.as_str(),
                    action: "stop",
                });
            }
        }

        self.state = LifecycleState::Draining;
        info!(tasks = self.tracker.len(), ?timeout, "draining background tasks");

        let started = Instant::now();
        self.cancel.cancel();
        self.tracker.close();

        let outcome = match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => {
                info!(elapsed = ?started.elapsed(), "background tasks drained");
                DrainOutcome::Drained
            }
            Err(_) => {
                let still_running = self.tracker.len();
                error!(still_running, ?timeout, "timed out draining background tasks");
                DrainOutcome::TimedOut { still_running }
            }
        };

        self.state = LifecycleState::Stopped;
        Ok(DrainReport {
            outcome,
            elapsed: started.elapsed(),
        })
    }
}
