// # Entry Store Trait
//
// Defines the interface for persisting configuration entries and for
// observing option changes.
//
// ## Implementations
//
// - In-memory: [`crate::store::MemoryEntryStore`]
// - File-backed: [`crate::store::FileEntryStore`]

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::scheduler::CancelHandle;
use crate::config::{ConfigEntry, EntryId, EntryOptions};

/// Callback fired after an entry's options changed, with the updated entry
pub type UpdateListener =
    Arc<dyn Fn(ConfigEntry) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Trait for entry store implementations
///
/// A store owns the persisted entries. It assigns identifiers on create
/// and notifies registered listeners after every committed option change.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Fetch an entry by identifier
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))`: The entry exists
    /// - `Ok(None)`: No entry with that identifier
    /// - `Err(Error)`: The store itself failed
    async fn get(&self, entry_id: &EntryId) -> Result<Option<ConfigEntry>, crate::Error>;

    /// List all entries, ordered by identifier
    async fn list(&self) -> Result<Vec<ConfigEntry>, crate::Error>;

    /// Create a new entry and assign it an identifier
    ///
    /// # Parameters
    ///
    /// - `title`: Human-readable title for the entry
    /// - `options`: Options the entry starts with
    async fn create(&self, title: &str, options: EntryOptions)
    -> Result<ConfigEntry, crate::Error>;

    /// Replace an entry's options
    ///
    /// The change is committed first. Listeners registered for the entry
    /// are then invoked with the updated entry, one at a time, and each
    /// is awaited before this method returns.
    ///
    /// # Returns
    ///
    /// - `Ok(entry)`: The updated entry
    /// - `Err(Error::NotFound)`: No entry with that identifier
    async fn replace_options(
        &self,
        entry_id: &EntryId,
        options: EntryOptions,
    ) -> Result<ConfigEntry, crate::Error>;

    /// Register a listener for option changes on one entry
    ///
    /// Several listeners may watch the same entry. The returned handle
    /// removes the listener when cancelled or dropped; a listener already
    /// running is allowed to finish.
    fn add_update_listener(&self, entry_id: &EntryId, listener: UpdateListener) -> CancelHandle;
}
