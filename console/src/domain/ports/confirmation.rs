//! Driven port asking the user to confirm a destructive action.

use async_trait::async_trait;

/// Yes/no confirmation gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Confirmation: Send + Sync {
    /// Ask `prompt`; `true` means the user accepted.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation(pub bool);

#[async_trait]
impl Confirmation for FixedConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "confirmation answered automatically");
        self.0
    }
}
