//! Driven port for user-facing notices.
//!
//! Notices are fire-and-forget: a notifier cannot fail the operation that
//! raised it.

use std::fmt;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The operation completed.
    Success,
    /// The operation failed.
    Error,
}

/// Where a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTarget {
    /// The console's general notice area.
    Console,
    /// Inline in the alias editor.
    AliasEditor,
    /// Inline in the transfer editor.
    TransferEditor,
}

impl fmt::Display for NoticeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Console => "console",
            Self::AliasEditor => "alias-editor",
            Self::TransferEditor => "transfer-editor",
        })
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Display target.
    pub target: NoticeTarget,
    /// Message text.
    pub message: String,
}

impl Notice {
    /// Success notice for `target`.
    pub fn success(target: NoticeTarget, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            target,
            message: message.into(),
        }
    }

    /// Error notice for `target`.
    pub fn error(target: NoticeTarget, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            target,
            message: message.into(),
        }
    }
}

/// Presents notices to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show `notice`.
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the tracing subscriber.
///
/// Used by the headless binary, where there is no UI to render into.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(notice_target = %notice.target, text = %notice.message, "notice");
            }
            NoticeLevel::Error => {
                tracing::warn!(notice_target = %notice.target, text = %notice.message, "notice");
            }
        }
    }
}
