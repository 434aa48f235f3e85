//! Driven port for editor dialog lifecycle side effects (focus handling and
//! the like). Hooks run synchronously inside the dialog transitions.

use crate::domain::DialogKind;

/// Callbacks fired by [`crate::domain::Dialog`] transitions.
#[cfg_attr(test, mockall::automock)]
pub trait DialogHooks: Send + Sync {
    /// The dialog is becoming visible.
    fn on_open(&self, kind: DialogKind);

    /// The dialog is about to hide; move focus somewhere safe.
    fn before_close(&self, kind: DialogKind);

    /// The dialog is hidden.
    fn on_closed(&self, kind: DialogKind);
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDialogHooks;

impl DialogHooks for NoOpDialogHooks {
    fn on_open(&self, _kind: DialogKind) {}

    fn before_close(&self, _kind: DialogKind) {}

    fn on_closed(&self, _kind: DialogKind) {}
}
