//! Composition root wiring the owner registry, both stores and the shared
//! operation guard around one backend.

use std::sync::Arc;

use futures_util::future::join;

use super::alias_store::AliasStore;
use super::collaborators::Collaborators;
use super::error::ConsoleError;
use super::operation_guard::OperationGuard;
use super::owner_registry::OwnerRegistry;
use super::ports::{ExtrasBackend, NoticeTarget};
use super::statistics::{ExtrasStatistics, fetch_statistics};
use super::transfer_store::TransferStore;
use super::view::{AliasRow, TransferRow};

/// Caches a reload covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadScope {
    /// Aliases only.
    Aliases,
    /// Transfers only.
    Transfers,
    /// Both, concurrently.
    All,
}

/// Which part of the initial load failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Owner registry.
    Owners,
    /// Alias cache.
    Aliases,
    /// Transfer cache.
    Transfers,
}

/// Outcome of [`ExtrasConsole::load`]. Failures do not stop later stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Stages that failed, in load order.
    pub failures: Vec<(LoadStage, ConsoleError)>,
}

impl LoadReport {
    /// Whether every stage succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, stage: LoadStage, result: Result<usize, ConsoleError>) {
        if let Err(error) = result {
            self.failures.push((stage, error));
        }
    }
}

/// The alias and transfer console.
pub struct ExtrasConsole<B> {
    backend: Arc<B>,
    collaborators: Collaborators,
    registry: OwnerRegistry,
    aliases: AliasStore<B>,
    transfers: TransferStore<B>,
}

impl<B> ExtrasConsole<B>
where
    B: ExtrasBackend + 'static,
{
    /// Wire the registry and stores around `backend`. The alias store
    /// reloads the transfer cache after each successful alias save.
    pub fn new(backend: Arc<B>, collaborators: Collaborators) -> Self {
        let registry = OwnerRegistry::new();
        let guard = OperationGuard::new();
        let transfers = TransferStore::new(
            Arc::clone(&backend),
            registry.clone(),
            guard.clone(),
            collaborators.clone(),
        );
        let aliases = AliasStore::new(
            Arc::clone(&backend),
            registry.clone(),
            guard,
            collaborators.clone(),
        )
        .with_dependent(Arc::new(transfers.clone()));
        Self {
            backend,
            collaborators,
            registry,
            aliases,
            transfers,
        }
    }

    /// Load owners, aliases and transfers in that order.
    pub async fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();
        let owners = self.registry.load(self.backend.as_ref()).await;
        if let Err(error) = &owners {
            self.collaborators
                .surface(NoticeTarget::Console, "load owners", error);
        }
        report.record(LoadStage::Owners, owners);
        report.record(LoadStage::Aliases, self.aliases.load_all().await);
        report.record(LoadStage::Transfers, self.transfers.load_all().await);
        tracing::info!(failures = report.failures.len(), "console loaded");
        report
    }

    /// Reload the caches in `scope`.
    ///
    /// # Errors
    ///
    /// The first failing store's error; with [`ReloadScope::All`] both
    /// reloads still run to completion.
    pub async fn reload(&self, scope: ReloadScope) -> Result<(), ConsoleError> {
        match scope {
            ReloadScope::Aliases => self.aliases.load_all().await.map(drop),
            ReloadScope::Transfers => self.transfers.load_all().await.map(drop),
            ReloadScope::All => {
                let (aliases, transfers) =
                    join(self.aliases.load_all(), self.transfers.load_all()).await;
                aliases.and(transfers).map(drop)
            }
        }
    }

    /// Aggregate statistics.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Fetch`] or [`ConsoleError::InvalidResponse`]; either
    /// is also surfaced as a console notice.
    pub async fn statistics(&self) -> Result<ExtrasStatistics, ConsoleError> {
        let result = fetch_statistics(self.backend.as_ref()).await;
        if let Err(error) = &result {
            self.collaborators
                .surface(NoticeTarget::Console, "load statistics", error);
        }
        result
    }

    /// Close both editors and forget all cached data.
    pub fn dispose(&self) {
        self.aliases.close_editor();
        self.transfers.close_editor();
        self.aliases.clear();
        self.transfers.clear();
        tracing::debug!("console disposed");
    }

    /// Alias table rows; empty after a failed alias load.
    pub fn alias_rows(&self) -> Vec<AliasRow> {
        let owners = self.registry.snapshot();
        self.aliases
            .visible()
            .iter()
            .map(|alias| AliasRow::new(alias, &owners))
            .collect()
    }

    /// Transfer table rows; empty after a failed transfer load.
    pub fn transfer_rows(&self) -> Vec<TransferRow> {
        self.transfers
            .visible()
            .iter()
            .map(TransferRow::from)
            .collect()
    }

    /// The owner registry.
    pub const fn owners(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// The alias store.
    pub const fn aliases(&self) -> &AliasStore<B> {
        &self.aliases
    }

    /// The transfer store.
    pub const fn transfers(&self) -> &TransferStore<B> {
        &self.transfers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        BackendError, Envelope, FixtureExtrasBackend, MockExtrasBackend, MutationAck,
        TransferListing,
    };
    use crate::domain::{AliasDraft, AliasId, OwnerId};
    use crate::test_support::{TestCollaborators, sample_alias, sample_owner, sample_transfer};
    use rust_decimal::Decimal;

    fn healthy_backend() -> MockExtrasBackend {
        let mut backend = MockExtrasBackend::new();
        backend
            .expect_list_available_owners()
            .returning(|| Ok(Envelope::ok(vec![sample_owner(10, "Ana")])));
        backend
            .expect_list_active_aliases()
            .returning(|| Ok(Envelope::ok(vec![sample_alias(1, "A1", &[10])])));
        backend.expect_list_transfers().returning(|| {
            Ok(TransferListing::Bare(vec![sample_transfer(
                9,
                1,
                &[(10, Decimal::new(5, 0))],
            )]))
        });
        backend
    }

    #[tokio::test]
    async fn load_collects_failures_without_aborting() {
        let doubles = TestCollaborators::new(true);
        let mut backend = MockExtrasBackend::new();
        backend
            .expect_list_available_owners()
            .return_once(|| Err(BackendError::transport("refused")));
        backend
            .expect_list_active_aliases()
            .return_once(|| Ok(Envelope::ok(vec![sample_alias(1, "A1", &[10])])));
        backend
            .expect_list_transfers()
            .return_once(|| Err(BackendError::timeout("slow")));
        let console = ExtrasConsole::new(Arc::new(backend), doubles.collaborators.clone());

        let report = console.load().await;

        assert_eq!(
            report
                .failures
                .iter()
                .map(|(stage, _)| *stage)
                .collect::<Vec<_>>(),
            vec![LoadStage::Owners, LoadStage::Transfers]
        );
        assert_eq!(console.alias_rows().len(), 1);
        assert!(console.transfer_rows().is_empty());
        assert_eq!(doubles.notifier.errors_at(NoticeTarget::Console).len(), 2);
    }

    #[tokio::test]
    async fn alias_save_reloads_aliases_then_transfers() {
        let doubles = TestCollaborators::new(true);
        let mut backend = healthy_backend();
        backend.expect_create_alias().return_once(|_| {
            Ok(MutationAck {
                success: Some(true),
                ..MutationAck::default()
            })
        });
        let console = ExtrasConsole::new(Arc::new(backend), doubles.collaborators.clone());
        assert!(console.load().await.is_complete());

        console.aliases().begin_create();
        console
            .aliases()
            .save(&AliasDraft {
                label: "A2".to_owned(),
                owner_ids: vec![OwnerId::new(10)],
                active: true,
            })
            .await
            .expect("alias saved");
        console.transfers().clear();

        doubles.scheduler.run_pending().await;

        assert_eq!(console.transfer_rows().len(), 1);
        assert_eq!(
            console.alias_rows().first().map(|row| row.owners.as_str()),
            Some("Ana")
        );
    }

    #[tokio::test]
    async fn reload_all_runs_both_stores() {
        let doubles = TestCollaborators::new(true);
        let console = ExtrasConsole::new(Arc::new(healthy_backend()), doubles.collaborators.clone());

        console
            .reload(ReloadScope::All)
            .await
            .expect("both reloads succeed");

        assert_eq!(console.aliases().cached().len(), 1);
        assert_eq!(console.transfers().cached().len(), 1);
    }

    #[tokio::test]
    async fn dispose_closes_editors_and_clears_caches() {
        let doubles = TestCollaborators::new(true);
        let console = ExtrasConsole::new(Arc::new(healthy_backend()), doubles.collaborators.clone());
        console.load().await;
        console
            .aliases()
            .begin_edit(AliasId::new(1))
            .expect("alias cached");

        console.dispose();

        assert_eq!(console.aliases().editing(), None);
        assert!(console.alias_rows().is_empty());
        assert!(console.transfer_rows().is_empty());
    }

    #[tokio::test]
    async fn statistics_failure_is_surfaced() {
        let doubles = TestCollaborators::new(true);
        let mut backend = MockExtrasBackend::new();
        backend
            .expect_statistics()
            .return_once(|| Ok(Envelope::failed()));
        let console = ExtrasConsole::new(Arc::new(backend), doubles.collaborators.clone());

        let error = console.statistics().await.expect_err("not successful");

        assert!(matches!(error, ConsoleError::InvalidResponse { .. }));
        assert_eq!(doubles.notifier.errors_at(NoticeTarget::Console).len(), 1);
    }

    #[tokio::test]
    async fn fixture_backend_loads_an_empty_console() {
        let doubles = TestCollaborators::new(true);
        let console =
            ExtrasConsole::new(Arc::new(FixtureExtrasBackend), doubles.collaborators.clone());

        let report = console.load().await;

        assert!(report.is_complete(), "load failed: {report:?}");
        assert!(console.alias_rows().is_empty());
        assert!(console.transfer_rows().is_empty());
        assert_eq!(console.statistics().await, Ok(ExtrasStatistics::default()));
        assert!(doubles.notifier.notices().is_empty());
    }
}
