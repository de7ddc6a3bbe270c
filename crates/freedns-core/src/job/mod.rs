//! Scheduled update job
//!
//! Bridges an [`UpdateClient`] onto a [`Scheduler`]. Every cycle performs
//! one update attempt and absorbs whatever it returns: a failed cycle is
//! logged and the schedule keeps running. Nothing short of deactivation
//! stops the cadence.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::EntryOptions;
use crate::traits::scheduler::{CancelHandle, PeriodicCallback, Scheduler};
use crate::traits::update_client::{UpdateClient, UpdateOutcome};

/// Periodic update work for one entry
pub struct UpdateJob {
    client: Arc<dyn UpdateClient>,
    options: EntryOptions,
}

impl UpdateJob {
    /// Create a job for an entry's options
    pub fn new(client: Arc<dyn UpdateClient>, options: EntryOptions) -> Self {
        Self { client, options }
    }

    /// Register the job with a scheduler at the entry's scan interval
    ///
    /// # Returns
    ///
    /// The scheduler's [`CancelHandle`]; cancelling it stops future cycles.
    pub fn register(self, scheduler: &dyn Scheduler) -> CancelHandle {
        let interval = self.options.scan_interval();
        let job = Arc::new(self);
        let callback: PeriodicCallback = Arc::new(move |fired_at| {
            let job = Arc::clone(&job);
            Box::pin(async move { job.run_once(fired_at).await })
        });
        scheduler.register_periodic(interval, callback)
    }

    /// Run a single update cycle
    ///
    /// Never returns an error. Failures are logged at a severity matching
    /// their kind and otherwise swallowed, so one bad cycle cannot take
    /// the schedule down.
    pub async fn run_once(&self, fired_at: DateTime<Utc>) {
        let result = self
            .client
            .attempt_update(
                self.options.url.as_deref(),
                self.options.access_token.as_deref(),
                self.options.request_timeout(),
            )
            .await;

        match result {
            Ok(UpdateOutcome::Updated { message }) => {
                debug!(%fired_at, %message, "scheduled FreeDNS update applied");
            }
            Ok(UpdateOutcome::Unchanged) => {
                debug!(%fired_at, "scheduled FreeDNS update skipped, IP has not changed");
            }
            Err(err @ crate::Error::InvalidAuth) => {
                error!(%fired_at, error = %err, "scheduled FreeDNS update failed");
            }
            Err(err) => {
                warn!(%fired_at, error = %err, "scheduled FreeDNS update failed");
            }
        }
    }
}
