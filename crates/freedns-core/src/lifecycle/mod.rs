//! Entry lifecycle controller
//!
//! Drives an entry between its inactive and active states. Activation
//! runs in a fixed sequence: register the options listener, prove the
//! configuration with one immediate update, register the periodic job,
//! then record the runtime in the registry. A failed proof tears the
//! listener back down and reports the entry as not ready, leaving it
//! clean for a later retry.
//!
//! ```text
//!   activate(id)
//!     ├─ store.get(id)
//!     ├─ store.add_update_listener(id)   ──┐ torn down again
//!     ├─ client.attempt_update(..)  ─ Err ─┘ -> Err(NotReady)
//!     ├─ job.register(scheduler)
//!     └─ registry.insert(id, runtime)
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Error;
use crate::config::{ConfigEntry, EntryId};
use crate::job::UpdateJob;
use crate::registry::{EntryRegistry, EntryRuntime};
use crate::traits::entry_store::{EntryStore, UpdateListener};
use crate::traits::scheduler::Scheduler;
use crate::traits::update_client::UpdateClient;

/// Controller owning activation and deactivation of entries
///
/// Cheap to clone; all components are shared.
#[derive(Clone)]
pub struct EntryLifecycle {
    client: Arc<dyn UpdateClient>,
    scheduler: Arc<dyn Scheduler>,
    store: Arc<dyn EntryStore>,
    registry: Arc<EntryRegistry>,
}

impl EntryLifecycle {
    /// Assemble a lifecycle controller from its components
    pub fn new(
        client: Arc<dyn UpdateClient>,
        scheduler: Arc<dyn Scheduler>,
        store: Arc<dyn EntryStore>,
        registry: Arc<EntryRegistry>,
    ) -> Self {
        Self {
            client,
            scheduler,
            store,
            registry,
        }
    }

    /// Registry tracking which entries are active
    pub fn registry(&self) -> &EntryRegistry {
        &self.registry
    }

    /// Activate an entry
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The entry proved its configuration and is now scheduled
    /// - `Err(Error::NotReady)`: The immediate update failed; nothing was
    ///   registered and the call may be retried later
    /// - `Err(Error::NotFound)`: The store has no such entry
    /// - `Err(Error::InvalidInput)`: The entry is already active
    pub async fn activate(&self, entry_id: &EntryId) -> Result<(), Error> {
        if self.registry.contains(entry_id) {
            return Err(Error::invalid_input(format!(
                "entry {entry_id} is already active"
            )));
        }

        let entry = self
            .store
            .get(entry_id)
            .await?
            .ok_or_else(|| Error::not_found(entry_id.to_string()))?;
        let options = entry.options;

        // Listener before the proving update; torn down again on failure.
        let listener_handle = self
            .store
            .add_update_listener(entry_id, self.reload_listener());

        let initial = self
            .client
            .attempt_update(
                options.url.as_deref(),
                options.access_token.as_deref(),
                options.request_timeout(),
            )
            .await;
        if let Err(cause) = initial {
            warn!(entry_id = %entry_id, error = %cause, "initial FreeDNS update failed; entry is not ready");
            drop(listener_handle);
            return Err(Error::not_ready(cause));
        }

        let schedule =
            UpdateJob::new(Arc::clone(&self.client), options).register(self.scheduler.as_ref());
        let displaced = self
            .registry
            .insert(entry_id.clone(), EntryRuntime::new(schedule, listener_handle));
        if displaced.is_some() {
            warn!(entry_id = %entry_id, "displaced runtime of a concurrent activation");
        }

        info!(entry_id = %entry_id, "entry activated");
        Ok(())
    }

    /// Deactivate an entry
    ///
    /// Cancels the periodic schedule and removes the options listener.
    /// An update cycle already in flight finishes on its own. Idempotent:
    /// deactivating an inactive entry does nothing.
    ///
    /// # Returns
    ///
    /// Whether the entry was active.
    pub async fn deactivate(&self, entry_id: &EntryId) -> bool {
        match self.registry.remove(entry_id) {
            Some(runtime) => {
                drop(runtime);
                info!(entry_id = %entry_id, "entry deactivated");
                true
            }
            None => {
                debug!(entry_id = %entry_id, "entry was not active");
                false
            }
        }
    }

    /// Deactivate and activate again, picking up current options
    pub async fn reload(&self, entry_id: &EntryId) -> Result<(), Error> {
        self.deactivate(entry_id).await;
        self.activate(entry_id).await
    }

    /// Listener that reloads the entry whenever its options change
    fn reload_listener(&self) -> UpdateListener {
        let lifecycle = self.clone();
        Arc::new(move |changed: ConfigEntry| {
            let lifecycle = lifecycle.clone();
            Box::pin(async move {
                debug!(entry_id = %changed.id, "entry options changed; reloading");
                if let Err(err) = lifecycle.reload(&changed.id).await {
                    warn!(entry_id = %changed.id, error = %err, "reload after options change failed");
                }
            })
        })
    }
}
