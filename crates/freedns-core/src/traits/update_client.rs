// # Update Client Trait
//
// Defines the interface for sending a dynamic DNS update to FreeDNS.
//
// ## Implementations
//
// - HTTP: `freedns-update-http` crate
//
// ## Usage
//
// ```rust,ignore
// use freedns_core::UpdateClient;
// use std::time::Duration;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* UpdateClient implementation */;
//
//     let outcome = client
//         .attempt_update(None, Some("tok123"), Duration::from_secs(10))
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::time::Duration;

/// Result of a successful update attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The service accepted the update
    Updated {
        /// Response body describing the change
        message: String,
    },
    /// The registered address already matched; nothing was changed
    Unchanged,
}

impl UpdateOutcome {
    /// Whether the attempt was a no-op
    pub fn is_unchanged(&self) -> bool {
        matches!(self, UpdateOutcome::Unchanged)
    }
}

/// Trait for update client implementations
///
/// An update client performs exactly one request per call and classifies
/// the service's answer. It never retries and never schedules; both are
/// owned by the caller.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait UpdateClient: Send + Sync {
    /// Send a single update request
    ///
    /// When `url` is set it is used verbatim (a custom URL embeds its own
    /// update key). Otherwise the default endpoint is used, with
    /// `access_token` appended as a bare query-parameter key.
    ///
    /// # Parameters
    ///
    /// - `url`: Custom update URL, if the entry has one
    /// - `access_token`: Update token for the default endpoint
    /// - `timeout`: Deadline for the whole request, including reading the body
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: The service accepted the attempt (possibly a no-op)
    /// - `Err(Error)`: The attempt failed; the variant tells the caller whether
    ///   the failure is a credential problem, a transport problem, or a timeout
    async fn attempt_update(
        &self,
        url: Option<&str>,
        access_token: Option<&str>,
        timeout: Duration,
    ) -> Result<UpdateOutcome, crate::Error>;
}
