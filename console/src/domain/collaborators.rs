//! Presentation-side collaborators shared by the stores, and the single
//! place where errors are turned into log lines and notices.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use super::error::ConsoleError;
use super::ports::{
    Confirmation, DialogHooks, FixedConfirmation, NoOpDialogHooks, Notice, NoticeTarget,
    Notifier, TaskScheduler, TokioTaskScheduler, TracingNotifier,
};

/// Result of a delete request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The backend confirmed the removal.
    Deleted,
    /// The user declined; nothing was sent.
    Declined,
}

/// Ports the stores call into besides the backend.
#[derive(Clone)]
pub struct Collaborators {
    /// Shows notices.
    pub notifier: Arc<dyn Notifier>,
    /// Confirms destructive actions.
    pub confirmation: Arc<dyn Confirmation>,
    /// Editor dialog lifecycle hooks.
    pub dialog_hooks: Arc<dyn DialogHooks>,
    /// Runs deferred reloads.
    pub scheduler: Arc<dyn TaskScheduler>,
    /// Source of "today" for new transfers.
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Collaborators for running without a UI: notices go to tracing,
    /// confirmations are declined, reloads spawn on tokio.
    pub fn headless() -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            confirmation: Arc::new(FixedConfirmation(false)),
            dialog_hooks: Arc::new(NoOpDialogHooks),
            scheduler: Arc::new(TokioTaskScheduler),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Ask the user to confirm `prompt`.
    ///
    /// The prompt is deferred by one scheduling tick so the action that
    /// triggered it can finish rendering first.
    pub async fn confirm(&self, prompt: &str) -> bool {
        tokio::task::yield_now().await;
        self.confirmation.confirm(prompt).await
    }

    /// Emit a success notice.
    pub fn succeed(&self, target: NoticeTarget, message: impl Into<String>) {
        self.notifier.notify(Notice::success(target, message));
    }

    /// Log `error` and, unless it is a suppressed duplicate, show it at
    /// `target`. `context` names the operation in logs.
    pub fn surface(&self, target: NoticeTarget, context: &str, error: &ConsoleError) {
        match error {
            ConsoleError::Suppressed { .. } => {
                tracing::debug!(context, %error, "suppressed operation not surfaced");
            }
            ConsoleError::Validation(_) | ConsoleError::NotFound { .. } => {
                tracing::info!(context, %error, notice_target = %target, "operation rejected");
                self.notifier.notify(Notice::error(target, error.to_string()));
            }
            ConsoleError::Fetch { .. } | ConsoleError::InvalidResponse { .. } => {
                tracing::error!(context, %error, notice_target = %target, "backend operation failed");
                self.notifier
                    .notify(Notice::error(target, format!("{context}: {error}")));
            }
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
