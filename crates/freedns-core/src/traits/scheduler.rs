// # Scheduler Trait
//
// Defines the interface for driving periodic work, and the cancellation
// handle returned by every registration.
//
// ## Implementations
//
// - Tokio timers: [`crate::sched::TokioScheduler`]
// - Tests drive callbacks by hand with a manual scheduler double
//
// ## Usage
//
// ```rust,ignore
// use freedns_core::traits::{PeriodicCallback, Scheduler};
// use std::sync::Arc;
// use std::time::Duration;
//
// let callback: PeriodicCallback = Arc::new(|fired_at| {
//     Box::pin(async move {
//         println!("fired at {fired_at}");
//     })
// });
// let handle = scheduler.register_periodic(Duration::from_secs(600), callback);
// // ...
// handle.cancel();
// ```

use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Callback invoked on every scheduler fire, with the fire timestamp
pub type PeriodicCallback =
    Arc<dyn Fn(DateTime<Utc>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Trait for periodic schedulers
///
/// A scheduler owns the cadence only. The callback owns its failures:
/// the future returned by a [`PeriodicCallback`] must not panic across
/// the await boundary, and the scheduler keeps firing regardless of what
/// previous invocations did.
pub trait Scheduler: Send + Sync {
    /// Register a callback to run every `interval`
    ///
    /// The first invocation happens one full interval after registration,
    /// not immediately. `interval` must be non-zero.
    ///
    /// # Returns
    ///
    /// A [`CancelHandle`] that stops future invocations when cancelled or
    /// dropped. Invocations already in flight are allowed to finish.
    fn register_periodic(&self, interval: Duration, callback: PeriodicCallback) -> CancelHandle;
}

/// Handle that tears down a registration when cancelled or dropped
///
/// Cancellation is idempotent: the teardown closure runs at most once,
/// no matter how often `cancel` is called or whether the handle is
/// dropped afterwards.
pub struct CancelHandle {
    teardown: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl CancelHandle {
    /// Wrap a teardown closure in a handle
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// Run the teardown if it has not run yet
    pub fn cancel(&self) {
        let teardown = {
            let mut slot = match self.teardown.lock() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            slot.take()
        };
        if let Some(teardown) = teardown {
            teardown();
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let armed = self
            .teardown
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("CancelHandle").field("armed", &armed).finish()
    }
}
