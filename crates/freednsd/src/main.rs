// # freednsd - FreeDNS Daemon
//
// A small daemon that keeps one FreeDNS entry updated. It is a thin
// integration layer: all update, scheduling and lifecycle logic lives
// in freedns-core, the HTTP transport in freedns-update-http.
//
// The freednsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime and the entry store
// 3. Activating the entry, retrying while the service is unreachable
// 4. Shutting down cleanly on SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Credentials (exactly one of the two)
// - `FREEDNS_ACCESS_TOKEN`: Update token for the default endpoint
// - `FREEDNS_URL`: Full custom update URL (embeds its own key)
//
// ### Tuning
// - `FREEDNS_SCAN_INTERVAL`: Minutes between updates (minimum 5, default 10)
// - `FREEDNS_TIMEOUT`: Request timeout in seconds (default 10)
//
// ### State Store
// - `FREEDNS_STATE_PATH`: Path to the entry file; omit for in-memory
//
// ### Logging
// - `FREEDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export FREEDNS_ACCESS_TOKEN=your_token
// export FREEDNS_SCAN_INTERVAL=10
// export FREEDNS_STATE_PATH=/var/lib/freedns/entries.json
//
// freednsd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use freedns_core::config::{
    DEFAULT_ENTRY_TITLE, DEFAULT_SCAN_INTERVAL_MINS, DEFAULT_TIMEOUT_SECS, EntryOptions,
    MIN_SCAN_INTERVAL_MINS,
};
use freedns_core::traits::EntryStore;
use freedns_core::{
    EntryLifecycle, EntryRegistry, Error, FileEntryStore, MemoryEntryStore, TokioScheduler,
};
use freedns_update_http::HttpUpdateClient;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Longest pause between activation retries while the entry is not ready
const MAX_ACTIVATION_BACKOFF: Duration = Duration::from_secs(80);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum FreednsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<FreednsExitCode> for ExitCode {
    fn from(code: FreednsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    url: Option<String>,
    access_token: Option<String>,
    scan_interval_mins: u32,
    timeout_secs: u64,
    state_path: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            url: env::var("FREEDNS_URL").ok().filter(|s| !s.is_empty()),
            access_token: env::var("FREEDNS_ACCESS_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            scan_interval_mins: env::var("FREEDNS_SCAN_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SCAN_INTERVAL_MINS),
            timeout_secs: env::var("FREEDNS_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            state_path: env::var("FREEDNS_STATE_PATH").ok().filter(|s| !s.is_empty()),
            log_level: env::var("FREEDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Entry options derived from the environment
    fn entry_options(&self) -> EntryOptions {
        let mut options = EntryOptions::new()
            .with_scan_interval(self.scan_interval_mins)
            .with_timeout(self.timeout_secs);
        if let Some(ref url) = self.url {
            options = options.with_url(url.clone());
        }
        if let Some(ref token) = self.access_token {
            options = options.with_access_token(token.clone());
        }
        options
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.url.is_none() && self.access_token.is_none() {
            anyhow::bail!(
                "Either FREEDNS_ACCESS_TOKEN or FREEDNS_URL is required. \
                Set one via: export FREEDNS_ACCESS_TOKEN=your_token"
            );
        }

        if self.url.is_some() && self.access_token.is_some() {
            anyhow::bail!(
                "FREEDNS_URL and FREEDNS_ACCESS_TOKEN are mutually exclusive. \
                Unset one of them."
            );
        }

        if self.scan_interval_mins < MIN_SCAN_INTERVAL_MINS {
            anyhow::bail!(
                "FREEDNS_SCAN_INTERVAL must be at least {} minutes. Got: {}",
                MIN_SCAN_INTERVAL_MINS,
                self.scan_interval_mins
            );
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("FREEDNS_TIMEOUT must be at least 1 second");
        }

        // Check state path parent directory up front so the failure is a
        // config error, not a runtime error after startup
        if let Some(ref path) = self.state_path
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            anyhow::bail!(
                "FREEDNS_STATE_PATH parent directory does not exist: {}. \
                Create it first: mkdir -p {}",
                parent.display(),
                parent.display()
            );
        }

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "FREEDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        // Full option validation, URL host membership included
        if let Err(e) = self.entry_options().validate() {
            anyhow::bail!("Invalid FreeDNS configuration: {}", e);
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return FreednsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return FreednsExitCode::ConfigError.into();
    }

    info!("Starting freednsd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return FreednsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            FreednsExitCode::RuntimeError
        } else {
            FreednsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let client = Arc::new(HttpUpdateClient::new());
    let scheduler = Arc::new(TokioScheduler::new());
    let registry = Arc::new(EntryRegistry::new());

    let store: Arc<dyn EntryStore> = match config.state_path {
        Some(ref path) => {
            info!("Using file entry store: {}", path);
            Arc::new(FileEntryStore::new(path).await?)
        }
        None => {
            info!("Using in-memory entry store");
            Arc::new(MemoryEntryStore::new())
        }
    };

    // The environment is the source of truth for the daemon: reuse a
    // persisted entry but overwrite its options on every boot.
    let options = config.entry_options();
    let entry = match store.list().await?.into_iter().next() {
        Some(existing) => {
            info!("Reusing persisted entry {}", existing.id);
            store.replace_options(&existing.id, options).await?
        }
        None => store.create(DEFAULT_ENTRY_TITLE, options).await?,
    };

    let lifecycle = EntryLifecycle::new(client, scheduler, Arc::clone(&store), registry);

    let mut shutdown = std::pin::pin!(wait_for_shutdown());

    // Keep retrying while FreeDNS is unreachable; a bad token or URL is
    // a hard failure and stops the daemon instead.
    let mut backoff = Duration::from_secs(5);
    loop {
        match lifecycle.activate(&entry.id).await {
            Ok(()) => break,
            Err(Error::NotReady(cause)) => {
                warn!(
                    "Entry is not ready: {}. Retrying in {} seconds",
                    cause,
                    backoff.as_secs()
                );
                tokio::select! {
                    received = &mut shutdown => {
                        info!("Received shutdown signal: {}", received?);
                        info!("Shutting down daemon");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_ACTIVATION_BACKOFF);
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "Entry {} active, updating every {} minute(s)",
        entry.id, entry.options.scan_interval_mins
    );

    let received = (&mut shutdown).await?;
    info!("Received shutdown signal: {}", received);

    lifecycle.deactivate(&entry.id).await;
    info!("Shutting down daemon");

    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT)
///
/// # Returns
///
/// The name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    // Set up signal handlers for SIGTERM and SIGINT
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(received)
}

/// Wait for a shutdown signal (CTRL-C only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
