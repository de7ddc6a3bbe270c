//! Tokio-backed periodic scheduler
//!
//! Wraps [`tokio::time::interval_at`] behind the [`Scheduler`] trait so
//! that scheduling stays swappable in tests. The first fire happens one
//! full interval after registration, never immediately.

use chrono::Utc;
use std::time::Duration;

use crate::traits::scheduler::{CancelHandle, PeriodicCallback, Scheduler};

/// Scheduler driving callbacks off the ambient Tokio runtime
///
/// Must be used from within a running runtime. Each fire runs the
/// callback in its own task: cancelling the registration stops the
/// cadence, while an invocation already in flight finishes on its own.
#[derive(Debug, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    /// Create a scheduler
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn register_periodic(&self, interval: Duration, callback: PeriodicCallback) -> CancelHandle {
        let cadence = tokio::spawn(async move {
            let first_fire = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(first_fire, interval);
            loop {
                ticker.tick().await;
                // Detached on purpose: aborting the cadence must not kill
                // a cycle that is already running.
                tokio::spawn(callback(Utc::now()));
            }
        });
        CancelHandle::new(move || cadence.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counting_callback(fires: &Arc<AtomicUsize>) -> PeriodicCallback {
        let fires = Arc::clone(fires);
        Arc::new(move |_fired_at| {
            let fires = Arc::clone(&fires);
            Box::pin(async move {
                fires.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn first_fire_waits_one_full_interval() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));
        let _handle =
            scheduler.register_periodic(Duration::from_secs(60), counting_callback(&fires));

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0, "must not fire before the interval");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_repeatedly_at_the_interval() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));
        let _handle =
            scheduler.register_periodic(Duration::from_secs(60), counting_callback(&fires));

        tokio::time::sleep(Duration::from_secs(181)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_fires() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));
        let handle =
            scheduler.register_periodic(Duration::from_secs(60), counting_callback(&fires));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1, "cancelled schedule kept firing");
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_cycle_survives_cancel() {
        let scheduler = TokioScheduler::new();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let callback: PeriodicCallback = Arc::new(move |_fired_at| {
            let flag = Arc::clone(&flag);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                flag.store(true, Ordering::SeqCst);
            })
        });

        let handle = scheduler.register_periodic(Duration::from_secs(60), callback);
        tokio::time::sleep(Duration::from_secs(61)).await;

        handle.cancel();
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(
            finished.load(Ordering::SeqCst),
            "cancel must not abort a cycle that already started"
        );
    }
}
