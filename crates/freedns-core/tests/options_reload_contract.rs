//! Architectural Contract Test: Options Reload
//!
//! This test verifies that a committed option change restarts the
//! entry's runtime with the new options.
//!
//! Constraints verified:
//! - A committed option change reschedules the entry at the new cadence
//! - The old schedule is cancelled; only the new one fires
//! - The reload proves itself with the current options
//! - A reload whose proving update fails leaves the entry inactive,
//!   but the option change stays committed
//!
//! If this test fails, option changes are broken.

mod common;

use common::*;
use freedns_core::traits::EntryStore;
use freedns_core::{EntryLifecycle, EntryRegistry, Error, MemoryEntryStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn options_change_reschedules_with_new_cadence() {
    let client = Arc::new(ScriptedUpdateClient::new());
    let scheduler = Arc::new(ManualScheduler::new());
    let store = Arc::new(MemoryEntryStore::new());
    let registry = Arc::new(EntryRegistry::new());
    let lifecycle = EntryLifecycle::new(
        client.clone(),
        scheduler.clone(),
        store.clone(),
        registry.clone(),
    );

    let entry = store
        .create("FreeDNS", token_options())
        .await
        .expect("create succeeds");
    lifecycle
        .activate(&entry.id)
        .await
        .expect("activation succeeds");
    assert_eq!(scheduler.interval_of(0), Duration::from_secs(600));

    // Committing a 5 minute cadence reloads the entry
    store
        .replace_options(&entry.id, token_options().with_scan_interval(5))
        .await
        .expect("replace succeeds");

    assert_eq!(
        client.call_count(),
        2,
        "the reload proved itself with a fresh update"
    );
    assert_eq!(scheduler.registration_count(), 2);
    assert_eq!(
        scheduler.interval_of(1),
        Duration::from_secs(300),
        "the new schedule uses the new cadence"
    );
    assert_eq!(
        scheduler.active_count(),
        1,
        "the old schedule was cancelled"
    );
    assert!(registry.contains(&entry.id), "entry stayed active");
}

#[tokio::test]
async fn only_the_new_schedule_fires_after_reload() {
    let client = Arc::new(ScriptedUpdateClient::new());
    let scheduler = Arc::new(ManualScheduler::new());
    let store = Arc::new(MemoryEntryStore::new());
    let registry = Arc::new(EntryRegistry::new());
    let lifecycle = EntryLifecycle::new(
        client.clone(),
        scheduler.clone(),
        store.clone(),
        registry.clone(),
    );

    let entry = store
        .create("FreeDNS", token_options())
        .await
        .expect("create succeeds");
    lifecycle
        .activate(&entry.id)
        .await
        .expect("activation succeeds");
    store
        .replace_options(&entry.id, token_options().with_scan_interval(5))
        .await
        .expect("replace succeeds");

    // Slot 0 is the pre-reload schedule and must be dead
    scheduler.fire(0).await;
    assert_eq!(
        client.call_count(),
        2,
        "the cancelled schedule produced no cycle"
    );

    scheduler.fire(1).await;
    assert_eq!(client.call_count(), 3, "the replacement schedule is live");
}

#[tokio::test]
async fn reload_proves_with_current_options() {
    // Verify that the runtime picks up whatever the store now holds

    let client = Arc::new(ScriptedUpdateClient::new());
    let scheduler = Arc::new(ManualScheduler::new());
    let store = Arc::new(MemoryEntryStore::new());
    let registry = Arc::new(EntryRegistry::new());
    let lifecycle = EntryLifecycle::new(
        client.clone(),
        scheduler.clone(),
        store.clone(),
        registry.clone(),
    );

    let entry = store
        .create("FreeDNS", token_options())
        .await
        .expect("create succeeds");
    lifecycle
        .activate(&entry.id)
        .await
        .expect("activation succeeds");

    store
        .replace_options(
            &entry.id,
            freedns_core::config::EntryOptions::new()
                .with_access_token("tok456")
                .with_timeout(20),
        )
        .await
        .expect("replace succeeds");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].access_token.as_deref(),
        Some("tok456"),
        "the reload used the committed token"
    );
    assert_eq!(
        requests[1].timeout,
        Duration::from_secs(20),
        "the reload used the committed timeout"
    );
}

#[tokio::test]
async fn failed_reload_leaves_entry_inactive_but_committed() {
    let client = Arc::new(ScriptedUpdateClient::new());
    let scheduler = Arc::new(ManualScheduler::new());
    let store = Arc::new(MemoryEntryStore::new());
    let registry = Arc::new(EntryRegistry::new());
    let lifecycle = EntryLifecycle::new(
        client.clone(),
        scheduler.clone(),
        store.clone(),
        registry.clone(),
    );

    let entry = store
        .create("FreeDNS", token_options())
        .await
        .expect("create succeeds");
    lifecycle
        .activate(&entry.id)
        .await
        .expect("activation succeeds");

    // The reload's proving update fails; the commit itself must not
    client.queue(Err(Error::InvalidAuth));
    let updated = store
        .replace_options(&entry.id, token_options().with_scan_interval(5))
        .await
        .expect("the commit is independent of the reload outcome");
    assert_eq!(updated.options.scan_interval_mins, 5);

    assert!(
        !registry.contains(&entry.id),
        "the entry dropped out of the active set"
    );
    assert_eq!(scheduler.active_count(), 0);

    let stored = store
        .get(&entry.id)
        .await
        .expect("get succeeds")
        .expect("entry still exists");
    assert_eq!(
        stored.options.scan_interval_mins, 5,
        "the option change survived the failed reload"
    );

    // The host can activate again once the service recovers
    lifecycle
        .activate(&entry.id)
        .await
        .expect("manual reactivation succeeds");
    assert!(registry.contains(&entry.id));
    assert_eq!(scheduler.active_count(), 1);
}
