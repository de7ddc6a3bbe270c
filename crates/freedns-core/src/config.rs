//! Configuration types for FreeDNS entries
//!
//! This module defines the per-entry options, the persisted entry record,
//! and the service constants shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default update endpoint used when no custom URL is configured
pub const DEFAULT_UPDATE_URL: &str = "https://freedns.afraid.org/dynamic/update.php";

/// Domain a custom update URL must belong to
pub const REQUIRED_URL_DOMAIN: &str = "afraid.org";

/// Smallest accepted scan interval, in minutes
pub const MIN_SCAN_INTERVAL_MINS: u32 = 5;

/// Scan interval used when none is configured, in minutes
pub const DEFAULT_SCAN_INTERVAL_MINS: u32 = 10;

/// Per-request deadline used when none is configured, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Title given to newly created entries
pub const DEFAULT_ENTRY_TITLE: &str = "FreeDNS";

/// Identifier of a configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Create an entry identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Options of a single FreeDNS entry
///
/// Exactly one of `url` and `access_token` must be set. A custom URL
/// already embeds its update key in the path; a bare token is appended
/// to the default endpoint instead.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    /// Custom update URL, mutually exclusive with `access_token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Update token for the default endpoint, mutually exclusive with `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Minutes between scheduled update attempts
    #[serde(default = "default_scan_interval_mins")]
    pub scan_interval_mins: u32,

    /// Per-request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EntryOptions {
    /// Create options with defaults and no credentials
    pub fn new() -> Self {
        Self {
            url: None,
            access_token: None,
            scan_interval_mins: DEFAULT_SCAN_INTERVAL_MINS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom update URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set an update token for the default endpoint
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the scan interval in minutes
    pub fn with_scan_interval(mut self, mins: u32) -> Self {
        self.scan_interval_mins = mins;
        self
    }

    /// Set the per-request deadline in seconds
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Scan interval as a [`Duration`]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.scan_interval_mins) * 60)
    }

    /// Per-request deadline as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), crate::Error> {
        match (&self.url, &self.access_token) {
            (Some(_), Some(_)) => {
                return Err(crate::Error::config(
                    "update URL and access token are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(crate::Error::config(
                    "either an update URL or an access token is required",
                ));
            }
            _ => {}
        }

        if let Some(url) = &self.url {
            if !host_within_required_domain(url) {
                return Err(crate::Error::config(format!(
                    "update URL host must be {REQUIRED_URL_DOMAIN} or a subdomain of it"
                )));
            }
        }

        if self.scan_interval_mins < MIN_SCAN_INTERVAL_MINS {
            return Err(crate::Error::config(format!(
                "scan interval must be at least {MIN_SCAN_INTERVAL_MINS} minutes"
            )));
        }

        Ok(())
    }
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self::new()
    }
}

// The access token is a credential. Keep it out of Debug output so that
// logging an entry or its options never exposes it.
impl fmt::Debug for EntryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryOptions")
            .field("url", &self.url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<REDACTED>"),
            )
            .field("scan_interval_mins", &self.scan_interval_mins)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A configuration entry as held by an entry store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Store-assigned identifier
    pub id: EntryId,

    /// Human-readable title
    pub title: String,

    /// Options the entry runs with
    pub options: EntryOptions,

    /// When the entry was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Check that a URL parses and its host is the required domain or a
/// subdomain of it. Label-aware: `evilafraid.org` does not qualify.
pub(crate) fn host_within_required_domain(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    match parsed.host_str() {
        Some(host) => {
            host == REQUIRED_URL_DOMAIN
                || host
                    .strip_suffix(REQUIRED_URL_DOMAIN)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => false,
    }
}

fn default_scan_interval_mins() -> u32 {
    DEFAULT_SCAN_INTERVAL_MINS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
