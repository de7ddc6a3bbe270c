//! In-memory entry store
//!
//! Entries live for the lifetime of the process. Useful for embedding
//! and for tests; the daemon uses it when no state path is configured.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::ListenerSet;
use crate::Error;
use crate::config::{ConfigEntry, EntryId, EntryOptions};
use crate::traits::entry_store::{EntryStore, UpdateListener};
use crate::traits::scheduler::CancelHandle;

/// Entry store backed by a process-local map
pub struct MemoryEntryStore {
    entries: RwLock<HashMap<EntryId, ConfigEntry>>,
    listeners: ListenerSet,
    next_id: AtomicU64,
}

impl MemoryEntryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            listeners: ListenerSet::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn assign_id(&self) -> EntryId {
        EntryId::new(format!("entry-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

impl Default for MemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn get(&self, entry_id: &EntryId) -> Result<Option<ConfigEntry>, Error> {
        Ok(self.entries.read().await.get(entry_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ConfigEntry>, Error> {
        let mut entries: Vec<ConfigEntry> = self.entries.read().await.values().cloned().collect();
        entries.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(entries)
    }

    async fn create(&self, title: &str, options: EntryOptions) -> Result<ConfigEntry, Error> {
        let entry = ConfigEntry {
            id: self.assign_id(),
            title: title.to_string(),
            options,
            created_at: Utc::now(),
        };
        self.entries
            .write()
            .await
            .insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn replace_options(
        &self,
        entry_id: &EntryId,
        options: EntryOptions,
    ) -> Result<ConfigEntry, Error> {
        let updated = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(entry_id)
                .ok_or_else(|| Error::not_found(entry_id.to_string()))?;
            entry.options = options;
            entry.clone()
        };

        // Listeners run on a snapshot, after the lock is released, so a
        // listener may call back into this store.
        for listener in self.listeners.watching(entry_id) {
            listener(updated.clone()).await;
        }
        Ok(updated)
    }

    fn add_update_listener(&self, entry_id: &EntryId, listener: UpdateListener) -> CancelHandle {
        self.listeners.add(entry_id, listener)
    }
}
