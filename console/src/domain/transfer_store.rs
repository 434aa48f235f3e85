//! Transfer store: the local transfer cache, the transfer editor session and
//! the create, update and delete commands.
//!
//! Editing reconciles the saved allocations of the edited transfer against
//! the current membership of the selected alias, using an alias list fetched
//! live when the editor opens.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;

use super::alias::{Alias, AliasId};
use super::alias_store::fetch_active_aliases;
use super::cache::{Cache, CacheReload};
use super::collaborators::{Collaborators, DeleteOutcome};
use super::dialog::{DialogKind, EditorSession};
use super::error::{ConsoleError, EntityKind};
use super::operation_guard::{CacheKind, OperationGuard, OperationId};
use super::owner_registry::OwnerRegistry;
use super::ports::{ExtrasBackend, NoticeTarget};
use super::reconciler::reconcile;
use super::transfer::{Allocation, AllocationRow, Transfer, TransferForm, TransferId};

/// What the transfer editor shows when it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEditorView {
    /// Transfer being edited; `None` when creating.
    pub editing: Option<TransferId>,
    /// Alias selector options, fetched live.
    pub aliases: Vec<Alias>,
    /// Prefilled form.
    pub form: TransferForm,
}

#[derive(Debug)]
struct TransferEditor {
    session: EditorSession<TransferId>,
    alias_options: Vec<Alias>,
    saved_allocations: Vec<Allocation>,
}

impl TransferEditor {
    fn rows_for(&self, alias_id: AliasId, registry: &OwnerRegistry) -> Vec<AllocationRow> {
        self.alias_options
            .iter()
            .find(|alias| alias.id == alias_id)
            .map(|alias| {
                reconcile(
                    alias.owner_ids(),
                    &self.saved_allocations,
                    &registry.snapshot(),
                )
            })
            .unwrap_or_default()
    }
}

/// Transfer cache and commands.
pub struct TransferStore<B> {
    backend: Arc<B>,
    registry: OwnerRegistry,
    guard: OperationGuard,
    collaborators: Collaborators,
    cache: Cache<Transfer>,
    editor: Arc<Mutex<TransferEditor>>,
}

impl<B> Clone for TransferStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: self.registry.clone(),
            guard: self.guard.clone(),
            collaborators: self.collaborators.clone(),
            cache: self.cache.clone(),
            editor: Arc::clone(&self.editor),
        }
    }
}

impl<B> TransferStore<B> {
    /// Create a store with an empty cache and a closed editor.
    pub fn new(
        backend: Arc<B>,
        registry: OwnerRegistry,
        guard: OperationGuard,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            backend,
            registry,
            guard,
            collaborators,
            cache: Cache::default(),
            editor: Arc::new(Mutex::new(TransferEditor {
                session: EditorSession::new(DialogKind::Transfer),
                alias_options: Vec::new(),
                saved_allocations: Vec::new(),
            })),
        }
    }

    /// Every cached transfer, even after a failed reload.
    pub fn cached(&self) -> Vec<Transfer> {
        self.cache.snapshot()
    }

    /// Transfers to render; empty while the last load is failed.
    pub fn visible(&self) -> Vec<Transfer> {
        self.cache.visible()
    }

    /// Transfer currently open in the editor, if editing an existing one.
    pub fn editing(&self) -> Option<TransferId> {
        self.lock_editor().session.editing().copied()
    }

    /// Whether the transfer editor dialog is open.
    pub fn is_editor_open(&self) -> bool {
        self.lock_editor().session.dialog().is_open()
    }

    /// Rows for `alias_id` against the aliases fetched for the open editor.
    ///
    /// Saved amounts of the edited transfer prefill matching owners, even
    /// after switching to another alias that shares them.
    pub fn select_alias(&self, alias_id: Option<AliasId>) -> Vec<AllocationRow> {
        alias_id
            .map(|alias_id| self.lock_editor().rows_for(alias_id, &self.registry))
            .unwrap_or_default()
    }

    /// Close the editor and clear the edit marker.
    pub fn close_editor(&self) {
        let mut editor = self.lock_editor();
        editor
            .session
            .close(self.collaborators.dialog_hooks.as_ref());
        editor.alias_options.clear();
        editor.saved_allocations.clear();
    }

    /// Drop every cached transfer.
    pub fn clear(&self) {
        self.cache.clear();
    }

    fn lock_editor(&self) -> std::sync::MutexGuard<'_, TransferEditor> {
        self.editor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B> TransferStore<B>
where
    B: ExtrasBackend + 'static,
{
    /// Replace the cache with the backend's transfers.
    ///
    /// An unrecognised listing, including `{success: false}`, empties the
    /// cache without failing.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Fetch`] on transport failure, leaving the entries in
    /// place but hidden; [`ConsoleError::Suppressed`] when a reload is
    /// already running.
    pub async fn load_all(&self) -> Result<usize, ConsoleError> {
        let result = self
            .guard
            .run(OperationId::Reload(CacheKind::Transfers), || async {
                let transfers = self
                    .backend
                    .list_transfers()
                    .await?
                    .into_transfers()
                    .unwrap_or_else(|| {
                        tracing::warn!("transfer listing not recognised; showing no transfers");
                        Vec::new()
                    });
                let count = transfers.len();
                self.cache.replace(transfers);
                Ok(count)
            })
            .await;
        match &result {
            Ok(count) => tracing::debug!(count, "transfer cache reloaded"),
            Err(error) => {
                if !error.is_suppressed() {
                    self.cache.mark_failed();
                }
                self.collaborators
                    .surface(NoticeTarget::Console, "load transfers", error);
            }
        }
        result
    }

    /// Open the editor for a new transfer dated today.
    pub async fn begin_create(&self) -> TransferEditorView {
        {
            let mut editor = self.lock_editor();
            editor
                .session
                .begin_create(self.collaborators.dialog_hooks.as_ref());
            editor.saved_allocations.clear();
        }
        let aliases = self.refresh_alias_options().await;
        TransferEditorView {
            editing: None,
            aliases,
            form: TransferForm {
                created_date: Some(self.collaborators.clock.local().date_naive()),
                ..TransferForm::default()
            },
        }
    }

    /// Open the editor for cached transfer `id`.
    ///
    /// The alias selector is repopulated from a live fetch; if that fails the
    /// error is shown in the editor and the selector stays empty.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] when `id` is not cached. The backend is not
    /// consulted for the transfer itself.
    pub async fn begin_edit(&self, id: TransferId) -> Result<TransferEditorView, ConsoleError> {
        let Some(transfer) = self.cache.find(|transfer| transfer.id == id) else {
            let error = ConsoleError::not_found(EntityKind::Transfer, id.get());
            self.collaborators
                .surface(NoticeTarget::Console, "edit transfer", &error);
            return Err(error);
        };
        {
            let mut editor = self.lock_editor();
            editor
                .session
                .begin_edit(id, self.collaborators.dialog_hooks.as_ref());
            editor.saved_allocations = transfer.allocations.as_slice().to_vec();
        }
        let aliases = self.refresh_alias_options().await;
        let rows = self.lock_editor().rows_for(transfer.alias_id, &self.registry);
        Ok(TransferEditorView {
            editing: Some(id),
            aliases,
            form: TransferForm {
                alias_id: Some(transfer.alias_id),
                name: transfer.name,
                created_date: transfer.created_date,
                end_date: transfer.end_date,
                rows,
            },
        })
    }

    /// Save the editor form: update the edited transfer, or create one.
    ///
    /// On failure the editor stays open and the edit marker is kept.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Validation`] before any backend call;
    /// [`ConsoleError::InvalidResponse`] when the acknowledgement carries
    /// neither an `id` nor a non-false `success`; [`ConsoleError::Fetch`] on
    /// transport failure; [`ConsoleError::Suppressed`] for a duplicate
    /// submission.
    pub async fn save(&self, form: &TransferForm) -> Result<(), ConsoleError> {
        let (editing, aliases) = {
            let editor = self.lock_editor();
            (
                editor.session.editing().copied(),
                editor.alias_options.clone(),
            )
        };
        let result = self.persist(editing, form, &aliases).await;
        match &result {
            Ok(()) => self.after_save(editing),
            Err(error) => {
                self.collaborators
                    .surface(NoticeTarget::TransferEditor, "save transfer", error);
            }
        }
        result
    }

    /// Delete cached transfer `id` after the user confirms.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] when `id` is not cached, plus the backend
    /// and guard errors of [`TransferStore::save`].
    pub async fn delete(&self, id: TransferId) -> Result<DeleteOutcome, ConsoleError> {
        let result = self.delete_confirmed(id).await;
        if let Err(error) = &result {
            self.collaborators
                .surface(NoticeTarget::Console, "delete transfer", error);
        }
        result
    }

    async fn delete_confirmed(&self, id: TransferId) -> Result<DeleteOutcome, ConsoleError> {
        let transfer = self
            .cache
            .find(|transfer| transfer.id == id)
            .ok_or_else(|| ConsoleError::not_found(EntityKind::Transfer, id.get()))?;
        let prompt = format!("Delete transfer \"{}\"?", transfer.name);
        if !self.collaborators.confirm(&prompt).await {
            tracing::debug!(transfer_id = %id, "transfer deletion declined");
            return Ok(DeleteOutcome::Declined);
        }

        self.guard
            .run(OperationId::DeleteTransfer(id), || async {
                let ack = self.backend.delete_transfer(id).await?;
                if ack.confirms_removal() {
                    Ok(())
                } else {
                    Err(ConsoleError::invalid_response(
                        "transfer deletion was not acknowledged",
                    ))
                }
            })
            .await?;
        self.cache.remove(|transfer| transfer.id == id);
        tracing::info!(transfer_id = %id, "transfer deleted");
        self.collaborators
            .succeed(NoticeTarget::Console, "Transfer deleted");
        Ok(DeleteOutcome::Deleted)
    }

    async fn refresh_alias_options(&self) -> Vec<Alias> {
        let aliases = match fetch_active_aliases(self.backend.as_ref()).await {
            Ok(aliases) => aliases,
            Err(error) => {
                self.collaborators
                    .surface(NoticeTarget::TransferEditor, "load aliases", &error);
                Vec::new()
            }
        };
        self.lock_editor().alias_options.clone_from(&aliases);
        aliases
    }

    async fn persist(
        &self,
        editing: Option<TransferId>,
        form: &TransferForm,
        aliases: &[Alias],
    ) -> Result<(), ConsoleError> {
        let submission = form.validate(aliases)?;
        let operation = editing.map_or(OperationId::CreateTransfer, OperationId::UpdateTransfer);
        self.guard
            .run(operation, || async {
                let ack = match editing {
                    Some(id) => self.backend.update_transfer(id, &submission).await?,
                    None => self.backend.create_transfer(&submission).await?,
                };
                if ack.confirms_saved_record() {
                    Ok(())
                } else {
                    Err(ConsoleError::invalid_response(format!(
                        "transfer save was not acknowledged: {}",
                        ack.message.as_deref().unwrap_or("no message")
                    )))
                }
            })
            .await
    }

    fn after_save(&self, editing: Option<TransferId>) {
        tracing::info!(transfer_id = ?editing.map(TransferId::get), "transfer saved");
        self.close_editor();
        self.collaborators.succeed(
            NoticeTarget::Console,
            if editing.is_some() {
                "Transfer updated"
            } else {
                "Transfer created"
            },
        );
        self.collaborators
            .scheduler
            .defer("reload-transfers", self.reload_task());
    }
}

impl<B> CacheReload for TransferStore<B>
where
    B: ExtrasBackend + 'static,
{
    fn reload_task(&self) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move {
            if let Err(error) = store.load_all().await {
                tracing::debug!(%error, "deferred transfer reload did not complete");
            }
        })
    }
}

#[cfg(test)]
#[path = "transfer_store_tests.rs"]
mod tests;
