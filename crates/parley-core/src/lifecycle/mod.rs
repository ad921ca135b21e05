//! Supervision of long-lived background tasks.
//!
//! The [`LifecycleManager`](manager::LifecycleManager) owns one cancellation
//! token and one task tracker. Tasks are started at boot, observe the token
//! cooperatively, and are awaited with a deadline at shutdown.

pub mod manager;
pub mod metrics;

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// A long-lived task run under the lifecycle manager.
///
/// `run` must return promptly once `cancel` fires: implementations select
/// between their work and `cancel.cancelled()` at every suspension point.
pub trait BackgroundTask: Send + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn run(self, cancel: CancellationToken) -> impl Future<Output = ()> + Send + 'static;
}
