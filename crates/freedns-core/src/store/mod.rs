//! Entry store implementations
//!
//! - [`MemoryEntryStore`]: in-memory, entries are lost on restart
//! - [`FileEntryStore`]: JSON file with atomic writes and backup recovery

pub mod file;
pub mod memory;

pub use file::FileEntryStore;
pub use memory::MemoryEntryStore;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::EntryId;
use crate::traits::entry_store::UpdateListener;
use crate::traits::scheduler::CancelHandle;

struct ListenerEntry {
    token: u64,
    entry_id: EntryId,
    listener: UpdateListener,
}

/// Listener bookkeeping shared by the store implementations
///
/// The lock is only ever held for registration, removal, and snapshots.
/// Dispatch runs on a snapshot, so a listener may freely call back into
/// the store that fired it.
pub(crate) struct ListenerSet {
    entries: Arc<Mutex<Vec<ListenerEntry>>>,
    next_token: AtomicU64,
}

impl ListenerSet {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_token: AtomicU64::new(1),
        }
    }

    /// Register a listener for one entry
    pub(crate) fn add(&self, entry_id: &EntryId, listener: UpdateListener) -> CancelHandle {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().push(ListenerEntry {
            token,
            entry_id: entry_id.clone(),
            listener,
        });

        let entries = Arc::clone(&self.entries);
        CancelHandle::new(move || {
            entries.lock().unwrap().retain(|entry| entry.token != token);
        })
    }

    /// Snapshot the listeners watching one entry
    pub(crate) fn watching(&self, entry_id: &EntryId) -> Vec<UpdateListener> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| &entry.entry_id == entry_id)
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }
}
