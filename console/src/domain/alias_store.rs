//! Alias store: the local alias cache, the alias editor session and the
//! create, update and delete commands.
//!
//! Every mutation goes through the shared [`OperationGuard`] and touches the
//! cache only after the backend confirms it. Errors are surfaced through
//! [`Collaborators::surface`] and returned to the caller.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;

use super::alias::{Alias, AliasDraft, AliasId};
use super::cache::{Cache, CacheReload};
use super::collaborators::{Collaborators, DeleteOutcome};
use super::dialog::{DialogKind, EditorSession};
use super::error::{ConsoleError, EntityKind};
use super::operation_guard::{CacheKind, OperationGuard, OperationId};
use super::owner_registry::OwnerRegistry;
use super::ports::{ExtrasBackend, MutationAck, NoticeTarget};

/// Fetch the active aliases straight from the backend, bypassing any cache.
///
/// # Errors
///
/// [`ConsoleError::Fetch`] on transport failure and
/// [`ConsoleError::InvalidResponse`] when the envelope is not successful.
pub async fn fetch_active_aliases<B: ExtrasBackend + ?Sized>(
    backend: &B,
) -> Result<Vec<Alias>, ConsoleError> {
    backend
        .list_active_aliases()
        .await?
        .into_data()
        .ok_or_else(|| ConsoleError::invalid_response("alias listing was not successful"))
}

/// Alias cache and commands.
pub struct AliasStore<B> {
    backend: Arc<B>,
    registry: OwnerRegistry,
    guard: OperationGuard,
    collaborators: Collaborators,
    cache: Cache<Alias>,
    session: Arc<Mutex<EditorSession<AliasId>>>,
    dependents: Vec<Arc<dyn CacheReload>>,
}

impl<B> Clone for AliasStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: self.registry.clone(),
            guard: self.guard.clone(),
            collaborators: self.collaborators.clone(),
            cache: self.cache.clone(),
            session: Arc::clone(&self.session),
            dependents: self.dependents.clone(),
        }
    }
}

impl<B> AliasStore<B> {
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
            session: Arc::new(Mutex::new(EditorSession::new(DialogKind::Alias))),
            dependents: Vec::new(),
        }
    }

    /// Reload `dependent` after every successful alias save, once the alias
    /// cache itself has been reloaded.
    #[must_use]
    pub fn with_dependent(mut self, dependent: Arc<dyn CacheReload>) -> Self {
        self.dependents.push(dependent);
        self
    }

    /// Every cached alias, even after a failed reload.
    pub fn cached(&self) -> Vec<Alias> {
        self.cache.snapshot()
    }

    /// Aliases to render; empty while the last load is failed.
    pub fn visible(&self) -> Vec<Alias> {
        self.cache.visible()
    }

    /// Alias currently open in the editor, if editing an existing one.
    pub fn editing(&self) -> Option<AliasId> {
        self.lock_session().editing().copied()
    }

    /// Open the editor for a new alias.
    pub fn begin_create(&self) -> AliasDraft {
        self.lock_session()
            .begin_create(self.collaborators.dialog_hooks.as_ref());
        AliasDraft::default()
    }

    /// Open the editor for cached alias `id` and return the prefilled draft.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] when `id` is not cached.
    pub fn begin_edit(&self, id: AliasId) -> Result<AliasDraft, ConsoleError> {
        let Some(alias) = self.cache.find(|alias| alias.id == id) else {
            let error = ConsoleError::not_found(EntityKind::Alias, id.get());
            self.collaborators
                .surface(NoticeTarget::Console, "edit alias", &error);
            return Err(error);
        };
        self.lock_session()
            .begin_edit(id, self.collaborators.dialog_hooks.as_ref());
        Ok(AliasDraft::from_alias(&alias))
    }

    /// Close the editor and clear the edit marker.
    pub fn close_editor(&self) {
        self.lock_session()
            .close(self.collaborators.dialog_hooks.as_ref());
    }

    /// Drop every cached alias.
    pub fn clear(&self) {
        self.cache.clear();
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, EditorSession<AliasId>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B> AliasStore<B>
where
    B: ExtrasBackend + 'static,
{
    /// Replace the cache with the backend's active aliases.
    ///
    /// On failure the cache keeps its entries but renders empty.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Fetch`], [`ConsoleError::InvalidResponse`], or
    /// [`ConsoleError::Suppressed`] when a reload is already running.
    pub async fn load_all(&self) -> Result<usize, ConsoleError> {
        let result = self
            .guard
            .run(OperationId::Reload(CacheKind::Aliases), || async {
                let aliases = fetch_active_aliases(self.backend.as_ref()).await?;
                let count = aliases.len();
                self.cache.replace(aliases);
                Ok(count)
            })
            .await;
        match &result {
            Ok(count) => tracing::debug!(count, "alias cache reloaded"),
            Err(error) => {
                if !error.is_suppressed() {
                    self.cache.mark_failed();
                }
                self.collaborators
                    .surface(NoticeTarget::Console, "load aliases", error);
            }
        }
        result
    }

    /// Save the editor's draft: update when an alias is being edited,
    /// otherwise create.
    ///
    /// # Errors
    ///
    /// See [`AliasStore::create`].
    pub async fn save(&self, draft: &AliasDraft) -> Result<(), ConsoleError> {
        match self.editing() {
            Some(id) => self.update(id, draft).await,
            None => self.create(draft).await,
        }
    }

    /// Create an alias from `draft`.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Validation`] before any backend call when the draft is
    /// invalid; [`ConsoleError::InvalidResponse`] when the backend does not
    /// acknowledge with `success: true`; [`ConsoleError::Fetch`] on transport
    /// failure; [`ConsoleError::Suppressed`] for a duplicate submission.
    pub async fn create(&self, draft: &AliasDraft) -> Result<(), ConsoleError> {
        self.submit(None, draft).await
    }

    /// Update alias `id` from `draft`.
    ///
    /// # Errors
    ///
    /// As [`AliasStore::create`].
    pub async fn update(&self, id: AliasId, draft: &AliasDraft) -> Result<(), ConsoleError> {
        self.submit(Some(id), draft).await
    }

    /// Delete cached alias `id` after the user confirms.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] when `id` is not cached, plus the backend
    /// and guard errors of [`AliasStore::create`].
    pub async fn delete(&self, id: AliasId) -> Result<DeleteOutcome, ConsoleError> {
        let result = self.delete_confirmed(id).await;
        if let Err(error) = &result {
            self.collaborators
                .surface(NoticeTarget::Console, "delete alias", error);
        }
        result
    }

    async fn delete_confirmed(&self, id: AliasId) -> Result<DeleteOutcome, ConsoleError> {
        let alias = self
            .cache
            .find(|alias| alias.id == id)
            .ok_or_else(|| ConsoleError::not_found(EntityKind::Alias, id.get()))?;
        let prompt = format!("Delete alias \"{}\"?", alias.label);
        if !self.collaborators.confirm(&prompt).await {
            tracing::debug!(alias_id = %id, "alias deletion declined");
            return Ok(DeleteOutcome::Declined);
        }

        self.guard
            .run(OperationId::DeleteAlias(id), || async {
                let ack = self.backend.delete_alias(id).await?;
                require_success(&ack, "alias deletion")
            })
            .await?;
        self.cache.remove(|alias| alias.id == id);
        tracing::info!(alias_id = %id, "alias deleted");
        self.collaborators
            .succeed(NoticeTarget::Console, "Alias deleted");
        Ok(DeleteOutcome::Deleted)
    }

    async fn submit(&self, id: Option<AliasId>, draft: &AliasDraft) -> Result<(), ConsoleError> {
        let result = self.persist(id, draft).await;
        match &result {
            Ok(()) => self.after_save(id),
            Err(error) => {
                self.collaborators
                    .surface(NoticeTarget::AliasEditor, "save alias", error);
            }
        }
        result
    }

    async fn persist(&self, id: Option<AliasId>, draft: &AliasDraft) -> Result<(), ConsoleError> {
        let submission = draft.validate(&self.registry.snapshot())?;
        let operation = id.map_or(OperationId::CreateAlias, OperationId::UpdateAlias);
        self.guard
            .run(operation, || async {
                let ack = match id {
                    Some(id) => self.backend.update_alias(id, &submission).await?,
                    None => self.backend.create_alias(&submission).await?,
                };
                require_success(&ack, "alias save")
            })
            .await
    }

    fn after_save(&self, id: Option<AliasId>) {
        tracing::info!(alias_id = ?id.map(AliasId::get), "alias saved");
        self.close_editor();
        self.collaborators.succeed(
            NoticeTarget::Console,
            if id.is_some() {
                "Alias updated"
            } else {
                "Alias created"
            },
        );

        let reloads = std::iter::once(self.reload_task())
            .chain(self.dependents.iter().map(|dependent| dependent.reload_task()))
            .collect::<Vec<_>>();
        self.collaborators.scheduler.defer(
            "reload-after-alias-save",
            Box::pin(async move {
                for reload in reloads {
                    reload.await;
                }
            }),
        );
    }
}

impl<B> CacheReload for AliasStore<B>
where
    B: ExtrasBackend + 'static,
{
    fn reload_task(&self) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move {
            if let Err(error) = store.load_all().await {
                tracing::debug!(%error, "deferred alias reload did not complete");
            }
        })
    }
}

fn require_success(ack: &MutationAck, what: &str) -> Result<(), ConsoleError> {
    if ack.confirms_success() {
        return Ok(());
    }
    Err(ConsoleError::invalid_response(format!(
        "{what} was not acknowledged: {}",
        ack.message.as_deref().unwrap_or("no message")
    )))
}

#[cfg(test)]
#[path = "alias_store_tests.rs"]
mod tests;
