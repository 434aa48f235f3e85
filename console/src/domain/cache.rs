//! Per-store record cache with an explicit load status.
//!
//! The cache is replaced wholesale on a successful load and edited in place
//! only for confirmed deletions. A failed load leaves the entries untouched
//! but hides them, so views render the empty state instead of stale rows.

use std::sync::{Arc, PoisonError, RwLock};

use futures_util::future::BoxFuture;

/// Outcome of the most recent load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing loaded yet.
    #[default]
    NotLoaded,
    /// The last load succeeded.
    Loaded,
    /// The last load failed.
    Failed,
}

#[derive(Debug)]
struct CacheState<T> {
    entries: Vec<T>,
    status: LoadStatus,
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            status: LoadStatus::NotLoaded,
        }
    }
}

/// Shared, lock-protected record cache. Clones share state.
#[derive(Debug)]
pub struct Cache<T> {
    state: Arc<RwLock<CacheState<T>>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
        }
    }
}

impl<T: Clone> Cache<T> {
    /// Swap in a freshly loaded sequence.
    pub fn replace(&self, entries: Vec<T>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries = entries;
        state.status = LoadStatus::Loaded;
    }

    /// Record a failed load without touching the entries.
    pub fn mark_failed(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .status = LoadStatus::Failed;
    }

    /// Status of the most recent load.
    pub fn status(&self) -> LoadStatus {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    /// Every cached entry regardless of status.
    pub fn snapshot(&self) -> Vec<T> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    /// Entries to render: empty while the last load is failed.
    pub fn visible(&self) -> Vec<T> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state.status {
            LoadStatus::Failed => Vec::new(),
            LoadStatus::NotLoaded | LoadStatus::Loaded => state.entries.clone(),
        }
    }

    /// First entry matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .find(|entry| predicate(entry))
            .cloned()
    }

    /// Remove entries matching `predicate`; returns how many were removed.
    pub fn remove(&self, predicate: impl Fn(&T) -> bool) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = state.entries.len();
        state.entries.retain(|entry| !predicate(entry));
        before - state.entries.len()
    }

    /// Drop every entry and forget the load status.
    pub fn clear(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = CacheState::default();
    }
}

/// Something that can produce a detached reload of its own cache.
///
/// Used to chain dependent reloads after a save without the caller knowing
/// the concrete store type.
pub trait CacheReload: Send + Sync {
    /// A `'static` future reloading the cache; errors are surfaced by the
    /// store itself.
    fn reload_task(&self) -> BoxFuture<'static, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_load_hides_entries_until_next_success() {
        let cache = Cache::default();
        cache.replace(vec![1, 2, 3]);
        cache.mark_failed();

        assert!(cache.visible().is_empty());
        assert_eq!(cache.snapshot(), vec![1, 2, 3]);

        cache.replace(vec![4]);
        assert_eq!(cache.visible(), vec![4]);
        assert_eq!(cache.status(), LoadStatus::Loaded);
    }

    #[test]
    fn remove_and_find_use_predicates() {
        let cache = Cache::default();
        cache.replace(vec![1, 2, 2, 3]);

        assert_eq!(cache.remove(|value| *value == 2), 2);
        assert_eq!(cache.find(|value| *value > 1), Some(3));
        assert_eq!(cache.find(|value| *value == 2), None);
    }

    #[test]
    fn clones_share_state_and_clear_resets_status() {
        let cache = Cache::default();
        let other = cache.clone();
        other.replace(vec!["a"]);

        assert_eq!(cache.snapshot(), vec!["a"]);
        cache.clear();
        assert_eq!(other.status(), LoadStatus::NotLoaded);
        assert!(other.snapshot().is_empty());
    }
}
