//! Domain entities, stores and services for the extras console.
//!
//! Purpose: keep alias memberships, transfer allocations and their local
//! caches consistent with the backend while the user edits them. Adapters
//! reach the outside world only through the traits in [`ports`].

pub mod ports;

mod alias;
mod alias_store;
mod cache;
mod codec;
mod collaborators;
mod console;
mod dialog;
mod error;
mod operation_guard;
mod owner;
mod owner_registry;
mod reconciler;
mod statistics;
mod transfer;
mod transfer_store;
mod view;

pub use self::alias::{Alias, AliasDraft, AliasId, AliasSubmission};
pub use self::alias_store::{AliasStore, fetch_active_aliases};
pub use self::cache::{Cache, CacheReload, LoadStatus};
pub use self::codec::{
    Decoded, WireAmount, decode_allocations, decode_owner_ids, encode_allocations,
    encode_owner_ids, format_amount, parse_amount,
};
pub use self::collaborators::{Collaborators, DeleteOutcome};
pub use self::console::{ExtrasConsole, LoadReport, LoadStage, ReloadScope};
pub use self::dialog::{Dialog, DialogKind, DialogState, EditorSession};
pub use self::error::{ConsoleError, EntityKind, ValidationError};
pub use self::operation_guard::{CacheKind, OperationGuard, OperationId};
pub use self::owner::{Owner, OwnerDirectory, OwnerId, missing_owner_label};
pub use self::owner_registry::OwnerRegistry;
pub use self::reconciler::reconcile;
pub use self::statistics::{ExtrasStatistics, fetch_statistics};
pub use self::transfer::{
    Allocation, AllocationRow, Transfer, TransferForm, TransferId, TransferSubmission,
    total_amount,
};
pub use self::transfer_store::{TransferEditorView, TransferStore};
pub use self::view::{AliasRow, TransferRow};
