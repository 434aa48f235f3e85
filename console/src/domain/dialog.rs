//! Editor dialog lifecycle.
//!
//! Each editor owns one [`Dialog`]. Transitions run the [`DialogHooks`]
//! synchronously so focus can be moved out of the dialog before it hides.

use std::fmt;

use super::ports::DialogHooks;

/// Which editor a dialog belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    /// Alias create/edit dialog.
    Alias,
    /// Transfer create/edit dialog.
    Transfer,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Alias => "alias",
            Self::Transfer => "transfer",
        })
    }
}

/// Dialog lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    /// Hidden.
    #[default]
    Closed,
    /// `on_open` hooks are running.
    Opening,
    /// Visible and interactive.
    Open,
    /// `before_close` hooks are running.
    Closing,
}

/// One editor dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    kind: DialogKind,
    state: DialogState,
}

impl Dialog {
    /// A closed dialog of `kind`.
    pub const fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            state: DialogState::Closed,
        }
    }

    /// Dialog kind.
    pub const fn kind(&self) -> DialogKind {
        self.kind
    }

    /// Current state.
    pub const fn state(&self) -> DialogState {
        self.state
    }

    /// Whether the dialog is visible.
    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    /// Open the dialog. Returns `false` when it was not closed, in which case
    /// nothing happens.
    pub fn open(&mut self, hooks: &dyn DialogHooks) -> bool {
        if self.state != DialogState::Closed {
            tracing::debug!(dialog = %self.kind, state = ?self.state, "dialog already open");
            return false;
        }
        self.state = DialogState::Opening;
        hooks.on_open(self.kind);
        self.state = DialogState::Open;
        true
    }

    /// Close the dialog. Returns `false` when it was already closed.
    pub fn close(&mut self, hooks: &dyn DialogHooks) -> bool {
        if self.state == DialogState::Closed {
            return false;
        }
        self.state = DialogState::Closing;
        hooks.before_close(self.kind);
        self.state = DialogState::Closed;
        hooks.on_closed(self.kind);
        true
    }
}

/// A dialog plus the record it is editing, if any.
///
/// The marker is single-valued: beginning a new session replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession<T> {
    dialog: Dialog,
    editing: Option<T>,
}

impl<T> EditorSession<T> {
    /// Closed session for `kind`.
    pub const fn new(kind: DialogKind) -> Self {
        Self {
            dialog: Dialog::new(kind),
            editing: None,
        }
    }

    /// Open the editor for a new record, clearing any edit marker.
    pub fn begin_create(&mut self, hooks: &dyn DialogHooks) {
        self.editing = None;
        self.dialog.open(hooks);
    }

    /// Open the editor for `record`, replacing any edit marker.
    pub fn begin_edit(&mut self, record: T, hooks: &dyn DialogHooks) {
        self.editing = Some(record);
        self.dialog.open(hooks);
    }

    /// Close the editor and clear the marker.
    pub fn close(&mut self, hooks: &dyn DialogHooks) {
        self.editing = None;
        self.dialog.close(hooks);
    }

    /// Record currently being edited.
    pub const fn editing(&self) -> Option<&T> {
        self.editing.as_ref()
    }

    /// The underlying dialog.
    pub const fn dialog(&self) -> &Dialog {
        &self.dialog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockDialogHooks;
    use mockall::Sequence;

    #[test]
    fn open_then_close_runs_hooks_in_order() {
        let mut hooks = MockDialogHooks::new();
        let mut seq = Sequence::new();
        hooks
            .expect_on_open()
            .withf(|kind| *kind == DialogKind::Alias)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        hooks
            .expect_before_close()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        hooks
            .expect_on_closed()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut dialog = Dialog::new(DialogKind::Alias);
        assert!(dialog.open(&hooks));
        assert!(dialog.is_open());
        assert!(dialog.close(&hooks));
        assert_eq!(dialog.state(), DialogState::Closed);
    }

    #[test]
    fn reopening_and_double_close_are_no_ops() {
        let mut hooks = MockDialogHooks::new();
        hooks.expect_on_open().times(1).return_const(());
        hooks.expect_before_close().times(1).return_const(());
        hooks.expect_on_closed().times(1).return_const(());

        let mut dialog = Dialog::new(DialogKind::Transfer);
        assert!(dialog.open(&hooks));
        assert!(!dialog.open(&hooks));
        assert_eq!(dialog.state(), DialogState::Open);
        assert!(dialog.close(&hooks));
        assert!(!dialog.close(&hooks));
    }

    #[test]
    fn editor_session_keeps_a_single_marker() {
        let hooks = crate::domain::ports::NoOpDialogHooks;
        let mut session = EditorSession::new(DialogKind::Transfer);

        session.begin_edit(1, &hooks);
        session.begin_edit(2, &hooks);
        assert_eq!(session.editing(), Some(&2));
        assert!(session.dialog().is_open());

        session.begin_create(&hooks);
        assert_eq!(session.editing(), None);

        session.begin_edit(3, &hooks);
        session.close(&hooks);
        assert_eq!(session.editing(), None);
        assert!(!session.dialog().is_open());
    }
}
