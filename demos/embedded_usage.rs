//! Minimal embedding example for freedns-core
//!
//! This example demonstrates using freedns-core as a library in a custom
//! application: the host drives the setup flow, persists the entry,
//! activates it and reacts to option changes. The update client is a
//! stand-in so the example runs without FreeDNS credentials.

use freedns_core::flow::{ConfigInput, FlowResult, OptionsFlow, OptionsInput, SetupFlow};
use freedns_core::traits::{EntryStore, UpdateClient, UpdateOutcome};
use freedns_core::{EntryLifecycle, EntryRegistry, MemoryEntryStore, Result, TokioScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Stand-in update client for embedded usage
struct EmbeddedUpdateClient {
    calls: AtomicUsize,
}

impl EmbeddedUpdateClient {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl UpdateClient for EmbeddedUpdateClient {
    async fn attempt_update(
        &self,
        url: Option<&str>,
        access_token: Option<&str>,
        timeout: Duration,
    ) -> Result<UpdateOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        println!(
            "[Embedded] FreeDNS update #{} (custom url: {}, token: {}, timeout: {:?})",
            call,
            url.is_some(),
            access_token.is_some(),
            timeout
        );

        // Simulate a successful update
        Ok(UpdateOutcome::Updated {
            message: format!("Updated example.afraid.org (call {})", call),
        })
    }
}

/// Drive a pending check to completion, polling like a UI would
async fn settle_check(flow: &mut SetupFlow, mut result: FlowResult) -> FlowResult {
    loop {
        match result {
            FlowResult::ShowProgress { .. } => {
                tokio::time::sleep(Duration::from_millis(250)).await;
                result = flow.step_check().await;
            }
            other => return other,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded freedns-core Example ===\n");

    // Create custom components
    let client = Arc::new(EmbeddedUpdateClient::new());
    let scheduler = Arc::new(TokioScheduler::new());
    let store = Arc::new(MemoryEntryStore::new());
    let registry = Arc::new(EntryRegistry::new());
    let lifecycle = EntryLifecycle::new(
        client.clone(),
        scheduler.clone(),
        store.clone(),
        registry.clone(),
    );

    // Walk the setup flow the way a configuration UI would
    println!("1. Walking the setup flow...");
    let mut flow = SetupFlow::new(client.clone());

    if let FlowResult::ShowForm { schema, .. } = flow.step_user(None).await {
        let fields: Vec<&str> = schema.fields.iter().map(|f| f.name).collect();
        println!("   Form fields: {}", fields.join(", "));
    }

    let submitted = flow
        .step_user(Some(ConfigInput::new().with_access_token("demo-token")))
        .await;
    println!("   Checking credentials (takes a couple of seconds)...");
    let checked = settle_check(&mut flow, submitted).await;
    match checked {
        FlowResult::ShowProgressDone { .. } => println!("   Check passed"),
        other => {
            eprintln!("   Setup check did not pass: {:?}", other);
            std::process::exit(1);
        }
    }

    let FlowResult::CreateEntry { title, options } = flow.step_finish().await else {
        eprintln!("   Setup flow did not produce an entry");
        std::process::exit(1);
    };

    // Persist what the flow produced
    println!("\n2. Persisting the entry...");
    let entry = store.create(&title, options).await?;
    println!(
        "   Created {} titled \"{}\" ({} minute cadence)",
        entry.id, entry.title, entry.options.scan_interval_mins
    );

    // Activate: one proving update, then a periodic schedule
    println!("\n3. Activating the entry...");
    lifecycle.activate(&entry.id).await?;
    println!("   Active entries: {:?}", registry.active_ids());

    // Edit the cadence through the options flow
    println!("\n4. Editing options...");
    let current = store
        .get(&entry.id)
        .await?
        .ok_or_else(|| freedns_core::Error::not_found(entry.id.to_string()))?;
    let mut options_flow = OptionsFlow::new(&current);
    let edited = options_flow
        .step_init(Some(OptionsInput::new().with_scan_interval(5)))
        .await;
    let FlowResult::CreateEntry {
        options: new_options,
        ..
    } = edited
    else {
        eprintln!("   Options flow rejected the input");
        std::process::exit(1);
    };

    // Committing the change reloads the entry automatically
    println!("\n5. Committing the change (the entry reloads itself)...");
    store.replace_options(&entry.id, new_options).await?;
    let reloaded = store
        .get(&entry.id)
        .await?
        .ok_or_else(|| freedns_core::Error::not_found(entry.id.to_string()))?;
    println!(
        "   New cadence: {} minute(s)",
        reloaded.options.scan_interval_mins
    );

    // Tear down
    println!("\n6. Deactivating...");
    lifecycle.deactivate(&entry.id).await;
    println!("   Active entries: {:?}", registry.active_ids());

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- Entry lifecycle is fully controlled by the application");
    println!("- The update client is swappable (no real credentials needed here)");
    println!("- Option changes committed to the store reload the runtime");
    println!("- No global state");

    Ok(())
}
