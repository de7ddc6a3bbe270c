//! Error types for the FreeDNS update system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for FreeDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the FreeDNS update system
#[derive(Error, Debug)]
pub enum Error {
    /// The update URL could not be parsed
    #[error("invalid update URL: {0}")]
    InvalidUrl(String),

    /// The service rejected the update token
    #[error("FreeDNS update token is invalid")]
    InvalidAuth,

    /// The service answered but refused the update
    #[error("FreeDNS update failed: {0}")]
    UpdateRejected(String),

    /// Transport-level HTTP failures (connect errors, bad status codes)
    #[error("HTTP error: {0}")]
    Http(String),

    /// No response from the service within the deadline
    #[error("timeout ({timeout_secs} seconds) from FreeDNS API at {host}")]
    Timeout {
        /// Host the request was addressed to
        host: String,
        /// Deadline that elapsed
        timeout_secs: u64,
    },

    /// An entry could not be activated yet; retrying later may succeed
    #[error("entry is not ready: {0}")]
    NotReady(#[source] Box<Error>),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entry store-related errors
    #[error("Entry store error: {0}")]
    Store(String),

    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors (file-backed stores)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl(url.into())
    }

    /// Create an update rejection error from the service response body
    pub fn update_rejected(body: impl Into<String>) -> Self {
        Self::UpdateRejected(body.into())
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(host: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            host: host.into(),
            timeout_secs,
        }
    }

    /// Wrap an activation failure that is worth retrying later
    pub fn not_ready(cause: Error) -> Self {
        Self::NotReady(Box::new(cause))
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an entry store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
