//! Read-only registry of owners available for assignment.

use std::sync::{Arc, PoisonError, RwLock};

use super::error::ConsoleError;
use super::owner::OwnerDirectory;
use super::ports::ExtrasBackend;

/// Shared owner registry. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct OwnerRegistry {
    directory: Arc<RwLock<OwnerDirectory>>,
}

impl OwnerRegistry {
    /// Empty, not-yet-loaded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every assignable owner and replace the registry.
    ///
    /// On failure the previous contents are kept.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Fetch`] when the backend is unreachable;
    /// [`ConsoleError::InvalidResponse`] when the envelope lacks
    /// `success: true` or data.
    pub async fn load<B: ExtrasBackend + ?Sized>(&self, backend: &B) -> Result<usize, ConsoleError> {
        let owners = backend
            .list_available_owners()
            .await?
            .into_data()
            .ok_or_else(|| ConsoleError::invalid_response("owner listing was not successful"))?;
        let count = owners.len();
        *self.directory.write().unwrap_or_else(PoisonError::into_inner) =
            OwnerDirectory::new(owners);
        tracing::debug!(count, "owner registry loaded");
        Ok(count)
    }

    /// Point-in-time copy for lookups.
    pub fn snapshot(&self) -> OwnerDirectory {
        self.directory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{BackendError, Envelope, MockExtrasBackend};
    use crate::domain::{Owner, OwnerId};

    fn owner(id: i64) -> Owner {
        Owner {
            id: OwnerId::new(id),
            name: format!("Owner {id}"),
            surname: None,
        }
    }

    #[tokio::test]
    async fn load_replaces_the_directory() {
        let mut backend = MockExtrasBackend::new();
        backend
            .expect_list_available_owners()
            .times(1)
            .return_once(|| Ok(Envelope::ok(vec![owner(10), owner(20)])));
        let registry = OwnerRegistry::new();

        let count = registry.load(&backend).await.expect("load succeeds");

        assert_eq!(count, 2);
        assert!(registry.snapshot().contains(OwnerId::new(20)));
        assert!(registry.snapshot().is_loaded());
    }

    #[tokio::test]
    async fn failed_envelope_keeps_previous_owners() {
        let mut backend = MockExtrasBackend::new();
        let mut responses = vec![
            Ok(Envelope::failed()),
            Ok(Envelope::ok(vec![owner(10)])),
        ];
        backend
            .expect_list_available_owners()
            .times(2)
            .returning(move || responses.pop().unwrap_or_else(|| Ok(Envelope::failed())));
        let registry = OwnerRegistry::new();

        registry.load(&backend).await.expect("first load succeeds");
        let error = registry.load(&backend).await.expect_err("second load fails");

        assert!(matches!(error, ConsoleError::InvalidResponse { .. }));
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_maps_to_fetch() {
        let mut backend = MockExtrasBackend::new();
        backend
            .expect_list_available_owners()
            .return_once(|| Err(BackendError::transport("refused")));

        let error = OwnerRegistry::new()
            .load(&backend)
            .await
            .expect_err("transport fails");

        assert!(matches!(error, ConsoleError::Fetch { .. }));
    }
}
