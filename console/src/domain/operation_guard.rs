//! At-most-one-in-flight execution per operation identity.
//!
//! A second invocation of an identity that is already running is dropped,
//! not queued. This replaces per-button "busy" flags: double-submitting a
//! save, or a reload racing another reload of the same cache, runs once.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use super::alias::AliasId;
use super::error::ConsoleError;
use super::transfer::TransferId;

/// Cache a reload refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Alias cache.
    Aliases,
    /// Transfer cache.
    Transfers,
}

/// Typed operation identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationId {
    /// `create-alias`
    CreateAlias,
    /// `update-alias-<id>`
    UpdateAlias(AliasId),
    /// `delete-alias-<id>`
    DeleteAlias(AliasId),
    /// `create-transfer`
    CreateTransfer,
    /// `update-transfer-<id>`
    UpdateTransfer(TransferId),
    /// `delete-transfer-<id>`
    DeleteTransfer(TransferId),
    /// `reload-aliases` / `reload-transfers`
    Reload(CacheKind),
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateAlias => f.write_str("create-alias"),
            Self::UpdateAlias(id) => write!(f, "update-alias-{id}"),
            Self::DeleteAlias(id) => write!(f, "delete-alias-{id}"),
            Self::CreateTransfer => f.write_str("create-transfer"),
            Self::UpdateTransfer(id) => write!(f, "update-transfer-{id}"),
            Self::DeleteTransfer(id) => write!(f, "delete-transfer-{id}"),
            Self::Reload(CacheKind::Aliases) => f.write_str("reload-aliases"),
            Self::Reload(CacheKind::Transfers) => f.write_str("reload-transfers"),
        }
    }
}

/// Shared set of in-flight operation identities.
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct OperationGuard {
    in_flight: Arc<Mutex<HashSet<OperationId>>>,
}

impl OperationGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` unless `id` is already in flight.
    ///
    /// The identity is released on every exit path, including when the
    /// returned future is dropped before completion.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Suppressed`] without invoking `operation` when
    /// `id` is in flight; otherwise returns whatever `operation` returns.
    pub async fn run<T, F, Fut>(&self, id: OperationId, operation: F) -> Result<T, ConsoleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ConsoleError>>,
    {
        let Some(_permit) = self.acquire(id) else {
            tracing::warn!(operation = %id, "duplicate operation suppressed");
            return Err(ConsoleError::suppressed(id.to_string()));
        };
        operation().await
    }

    /// Whether `id` is currently running.
    pub fn is_in_flight(&self, id: OperationId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    fn acquire(&self, id: OperationId) -> Option<Permit> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        inserted.then(|| Permit {
            in_flight: Arc::clone(&self.in_flight),
            id,
        })
    }
}

struct Permit {
    in_flight: Arc<Mutex<HashSet<OperationId>>>,
    id: OperationId,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[rstest]
    #[case(OperationId::CreateAlias, "create-alias")]
    #[case(OperationId::UpdateAlias(AliasId::new(4)), "update-alias-4")]
    #[case(OperationId::DeleteAlias(AliasId::new(4)), "delete-alias-4")]
    #[case(OperationId::CreateTransfer, "create-transfer")]
    #[case(OperationId::UpdateTransfer(TransferId::new(9)), "update-transfer-9")]
    #[case(OperationId::DeleteTransfer(TransferId::new(9)), "delete-transfer-9")]
    #[case(OperationId::Reload(CacheKind::Aliases), "reload-aliases")]
    #[case(OperationId::Reload(CacheKind::Transfers), "reload-transfers")]
    fn identities_render_stable_names(#[case] id: OperationId, #[case] expected: &str) {
        assert_eq!(id.to_string(), expected);
    }

    #[tokio::test]
    async fn concurrent_same_identity_runs_once() {
        let guard = OperationGuard::new();
        let calls = AtomicUsize::new(0);
        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = guard.run(OperationId::CreateAlias, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok::<_, ConsoleError>("first")
        });
        let second = async {
            let _ = started_rx.await;
            let result = guard
                .run(OperationId::CreateAlias, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ConsoleError>("second")
                })
                .await;
            let _ = release_tx.send(());
            result
        };

        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, Ok("first"));
        assert!(second.expect_err("duplicate is dropped").is_suppressed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!guard.is_in_flight(OperationId::CreateAlias));
    }

    #[tokio::test]
    async fn distinct_identities_do_not_block_each_other() {
        let guard = OperationGuard::new();

        let result = guard
            .run(OperationId::UpdateAlias(AliasId::new(1)), || async {
                assert!(guard.is_in_flight(OperationId::UpdateAlias(AliasId::new(1))));
                guard
                    .run(OperationId::UpdateAlias(AliasId::new(2)), || async {
                        Ok::<_, ConsoleError>(2)
                    })
                    .await
            })
            .await;

        assert_eq!(result, Ok(2));
    }

    #[tokio::test]
    async fn identity_is_released_after_failure() {
        let guard = OperationGuard::new();
        let id = OperationId::DeleteTransfer(TransferId::new(3));

        let failed = guard
            .run(id, || async { Err::<(), _>(ConsoleError::fetch("offline")) })
            .await;
        assert_eq!(failed, Err(ConsoleError::fetch("offline")));

        let retried = guard.run(id, || async { Ok::<_, ConsoleError>(()) }).await;
        assert_eq!(retried, Ok(()));
    }

    #[tokio::test]
    async fn identity_is_released_when_the_future_is_dropped() {
        let guard = OperationGuard::new();
        let id = OperationId::Reload(CacheKind::Aliases);

        {
            let pending = guard.run(id, || std::future::pending::<Result<(), ConsoleError>>());
            let mut pending = Box::pin(pending);
            let polled = futures_util::poll!(pending.as_mut());
            assert!(polled.is_pending());
            assert!(guard.is_in_flight(id));
        }

        assert!(!guard.is_in_flight(id));
    }
}
