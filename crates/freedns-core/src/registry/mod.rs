//! Runtime registry for active entries
//!
//! The registry tracks which entries are currently activated and owns
//! the cancellation handles that tear an activation down. Every datum a
//! running entry needs lives in its [`EntryRuntime`]; nothing is stashed
//! in globals.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::EntryId;
use crate::traits::scheduler::CancelHandle;

/// Handles owned by one active entry
///
/// Dropping a runtime cancels the periodic schedule and removes the
/// options listener. In-flight update cycles are allowed to finish.
#[derive(Debug)]
pub struct EntryRuntime {
    schedule: CancelHandle,
    update_listener: CancelHandle,
}

impl EntryRuntime {
    /// Bundle the handles of a freshly activated entry
    pub fn new(schedule: CancelHandle, update_listener: CancelHandle) -> Self {
        Self {
            schedule,
            update_listener,
        }
    }

    /// Cancel both handles without waiting for the runtime to drop
    pub fn cancel(&self) {
        self.schedule.cancel();
        self.update_listener.cancel();
    }
}

/// Registry of active entries
#[derive(Debug, Default)]
pub struct EntryRegistry {
    active: RwLock<HashMap<EntryId, EntryRuntime>>,
}

impl EntryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry as active
    ///
    /// Returns the runtime that was displaced, if the entry was already
    /// active. The caller decides when to drop it; teardown never runs
    /// under the registry lock.
    pub fn insert(&self, entry_id: EntryId, runtime: EntryRuntime) -> Option<EntryRuntime> {
        self.active.write().unwrap().insert(entry_id, runtime)
    }

    /// Take an entry's runtime out of the registry
    ///
    /// Returns `None` when the entry is not active. Dropping the returned
    /// runtime cancels its handles.
    pub fn remove(&self, entry_id: &EntryId) -> Option<EntryRuntime> {
        self.active.write().unwrap().remove(entry_id)
    }

    /// Whether an entry is currently active
    pub fn contains(&self, entry_id: &EntryId) -> bool {
        self.active.read().unwrap().contains_key(entry_id)
    }

    /// Identifiers of all active entries, ordered by identifier
    pub fn active_ids(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self.active.read().unwrap().keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.active.read().unwrap().len()
    }

    /// Whether no entry is active
    pub fn is_empty(&self) -> bool {
        self.active.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handle(calls: &Arc<AtomicUsize>) -> CancelHandle {
        let counter = Arc::clone(calls);
        CancelHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn insert_and_contains() {
        let registry = EntryRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        assert!(!registry.contains(&EntryId::from("entry-1")));
        registry.insert(
            EntryId::from("entry-1"),
            EntryRuntime::new(counting_handle(&calls), counting_handle(&calls)),
        );

        assert!(registry.contains(&EntryId::from("entry-1")));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn removing_and_dropping_cancels_both_handles() {
        let registry = EntryRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        registry.insert(
            EntryId::from("entry-1"),
            EntryRuntime::new(counting_handle(&calls), counting_handle(&calls)),
        );

        let runtime = registry.remove(&EntryId::from("entry-1"));
        assert!(runtime.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0, "teardown must wait for the drop");

        drop(runtime);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_missing_entry_returns_none() {
        let registry = EntryRegistry::new();
        assert!(registry.remove(&EntryId::from("entry-404")).is_none());
    }

    #[test]
    fn active_ids_are_ordered() {
        let registry = EntryRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for id in ["entry-3", "entry-1", "entry-2"] {
            registry.insert(
                EntryId::from(id),
                EntryRuntime::new(counting_handle(&calls), counting_handle(&calls)),
            );
        }

        let ids: Vec<String> = registry
            .active_ids()
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["entry-1", "entry-2", "entry-3"]);
    }
}
