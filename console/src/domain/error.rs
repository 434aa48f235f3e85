//! Error taxonomy shared by the stores.
//!
//! `Validation` and `NotFound` are resolved locally and shown next to the
//! form or action that caused them. `Fetch` and `InvalidResponse` originate
//! at the backend boundary. `Suppressed` is the operation guard dropping a
//! duplicate and is never shown to the user.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use super::alias::AliasId;
use super::owner::OwnerId;
use super::ports::BackendError;

/// Entity named in a [`ConsoleError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// An alias.
    Alias,
    /// A transfer.
    Transfer,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Alias => "alias",
            Self::Transfer => "transfer",
        })
    }
}

/// Client-side precondition failures, raised before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Alias label is blank.
    #[error("alias name is required")]
    AliasLabelRequired,
    /// Alias has no owners selected.
    #[error("select at least one owner")]
    OwnersRequired,
    /// The same owner appears twice in an alias.
    #[error("owner {0} is selected more than once")]
    DuplicateOwner(OwnerId),
    /// Owner is not present in the owner registry.
    #[error("owner {0} is not in the owner registry")]
    UnknownOwner(OwnerId),
    /// Transfer form has no alias selected.
    #[error("select an alias")]
    AliasRequired,
    /// Selected alias is not among the active aliases loaded for the editor.
    #[error("alias {0} is not available; reopen the editor to reload aliases")]
    UnknownAlias(AliasId),
    /// Transfer name is blank.
    #[error("transfer name is required")]
    TransferNameRequired,
    /// Transfer creation date is missing.
    #[error("creation date is required")]
    CreatedDateRequired,
    /// End date is earlier than the creation date.
    #[error("end date {end_date} must not precede creation date {created_date}")]
    EndDateBeforeCreatedDate {
        /// Creation date entered.
        created_date: NaiveDate,
        /// Offending end date.
        end_date: NaiveDate,
    },
    /// No row carries a parseable non-zero amount.
    #[error("enter at least one non-zero transfer amount")]
    AllocationRequired,
    /// An allocation targets an owner outside the selected alias.
    #[error("owner {0} is not a member of the selected alias")]
    OwnerOutsideAlias(OwnerId),
}

/// Errors returned by store and console operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Network or transport failure reaching the backend.
    #[error("backend unreachable: {message}")]
    Fetch {
        /// Transport diagnostic.
        message: String,
    },
    /// The backend answered with an unexpected shape.
    #[error("invalid backend response: {message}")]
    InvalidResponse {
        /// What was wrong with the response.
        message: String,
    },
    /// A client-side precondition failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Local cache lookup miss.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity looked up.
        entity: EntityKind,
        /// Raw identifier looked up.
        id: i64,
    },
    /// A duplicate invocation was dropped while the first is in flight.
    #[error("operation {operation} already in flight")]
    Suppressed {
        /// Identity of the in-flight operation.
        operation: String,
    },
}

impl ConsoleError {
    /// Convenience constructor for [`ConsoleError::Fetch`].
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ConsoleError::InvalidResponse`].
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ConsoleError::NotFound`].
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Convenience constructor for [`ConsoleError::Suppressed`].
    pub fn suppressed(operation: impl Into<String>) -> Self {
        Self::Suppressed {
            operation: operation.into(),
        }
    }

    /// Whether the guard dropped this call as a duplicate.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed { .. })
    }

    /// Whether the error originates at the backend boundary.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::InvalidResponse { .. })
    }
}

impl From<BackendError> for ConsoleError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Decode { message } => Self::invalid_response(message),
            other @ (BackendError::Transport { .. }
            | BackendError::Timeout { .. }
            | BackendError::Status { .. }
            | BackendError::InvalidRequest { .. }) => Self::fetch(other.to_string()),
        }
    }
}
