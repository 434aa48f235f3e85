//! Driven port for deferred, non-blocking work such as cache reloads after a
//! successful save.

use futures_util::future::BoxFuture;
use tokio::runtime::Handle;

/// Runs work after the current operation has returned.
#[cfg_attr(test, mockall::automock)]
pub trait TaskScheduler: Send + Sync {
    /// Schedule `task`. `label` names the work in logs.
    fn defer(&self, label: &'static str, task: BoxFuture<'static, ()>);
}

/// Scheduler spawning onto the ambient tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTaskScheduler;

impl TaskScheduler for TokioTaskScheduler {
    fn defer(&self, label: &'static str, task: BoxFuture<'static, ()>) {
        match Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(task = label, "deferred task scheduled");
                drop(handle.spawn(task));
            }
            Err(error) => {
                tracing::warn!(task = label, %error, "no tokio runtime; deferred task dropped");
            }
        }
    }
}
