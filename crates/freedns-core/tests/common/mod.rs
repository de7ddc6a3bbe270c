//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides minimal test doubles that verify architectural
//! constraints without talking to the real FreeDNS service or to real
//! timers.

use async_trait::async_trait;
use chrono::Utc;
use freedns_core::Error;
use freedns_core::config::EntryOptions;
use freedns_core::traits::{CancelHandle, PeriodicCallback, Scheduler, UpdateClient, UpdateOutcome};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Arguments captured from one attempt_update() call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub url: Option<String>,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

/// An UpdateClient that answers from a scripted queue
///
/// Each call pops the next queued result; when the queue is empty the
/// call succeeds with a canned `Updated` outcome. Every call and its
/// arguments are recorded for assertions.
pub struct ScriptedUpdateClient {
    /// Queued results, consumed front to back
    responses: Mutex<VecDeque<Result<UpdateOutcome, Error>>>,
    /// Call counter for attempt_update()
    calls: AtomicUsize,
    /// Arguments seen by attempt_update(), in call order
    requests: Mutex<Vec<RecordedUpdate>>,
}

impl ScriptedUpdateClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue the result for a future attempt_update() call
    pub fn queue(&self, result: Result<UpdateOutcome, Error>) {
        self.responses.lock().unwrap().push_back(result);
    }

    /// Get the number of times attempt_update() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Get the arguments of every attempt_update() call so far
    pub fn requests(&self) -> Vec<RecordedUpdate> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateClient for ScriptedUpdateClient {
    async fn attempt_update(
        &self,
        url: Option<&str>,
        access_token: Option<&str>,
        timeout: Duration,
    ) -> Result<UpdateOutcome, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedUpdate {
            url: url.map(str::to_string),
            access_token: access_token.map(str::to_string),
            timeout,
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(UpdateOutcome::Updated {
                message: "Updated example.afraid.org to 203.0.113.7".to_string(),
            }),
        }
    }
}

/// One registration held by the manual scheduler
struct ScheduledJob {
    interval: Duration,
    callback: PeriodicCallback,
    cancelled: Arc<AtomicBool>,
}

/// A Scheduler that never fires on its own
///
/// Tests drive registered callbacks by hand with [`ManualScheduler::fire`],
/// which makes cycle ordering deterministic. Cancelling a registration
/// marks it; fired slots that were cancelled do nothing, mirroring how a
/// real timer stops after its handle is dropped.
pub struct ManualScheduler {
    jobs: Mutex<Vec<ScheduledJob>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of registrations ever made, cancelled ones included
    pub fn registration_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Get the number of registrations that are still active
    pub fn active_count(&self) -> usize {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|job| !job.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Get the interval the numbered registration asked for
    pub fn interval_of(&self, index: usize) -> Duration {
        self.jobs.lock().unwrap()[index].interval
    }

    /// Run one cycle of the numbered registration, unless it was cancelled
    pub async fn fire(&self, index: usize) {
        let callback = {
            let jobs = self.jobs.lock().unwrap();
            let job = &jobs[index];
            if job.cancelled.load(Ordering::SeqCst) {
                None
            } else {
                Some(Arc::clone(&job.callback))
            }
        };

        if let Some(callback) = callback {
            callback(Utc::now()).await;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn register_periodic(&self, interval: Duration, callback: PeriodicCallback) -> CancelHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.jobs.lock().unwrap().push(ScheduledJob {
            interval,
            callback,
            cancelled: Arc::clone(&cancelled),
        });

        CancelHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

/// Helper to create token-based options with default cadence and timeout
pub fn token_options() -> EntryOptions {
    EntryOptions::new().with_access_token("tok123")
}
