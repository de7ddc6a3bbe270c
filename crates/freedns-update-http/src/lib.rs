// # FreeDNS HTTP Update Client
//
// This crate implements the update client against the FreeDNS
// (freedns.afraid.org) dynamic DNS API.
//
// ## Protocol
//
// An update is a single GET request. Two request shapes exist:
//
// - The default endpoint with `?<token>=` appended: the update token is
//   the NAME of a query parameter with an empty value, not `token=<value>`
// - A custom update URL, used verbatim (it embeds its own key)
//
// The service answers HTTP 200 with a short plain-text body for every
// outcome; success and failure are told apart by the body, not by the
// status code.
//
// ## Security
//
// The update token grants write access to the account's hosts and must
// never reach the logs. Errors built from reqwest strip the URL before
// formatting, and request logging records the target host only.

use async_trait::async_trait;
use freedns_core::Error;
use freedns_core::config::DEFAULT_UPDATE_URL;
use freedns_core::traits::{UpdateClient, UpdateOutcome};
use std::time::Duration;

/// User agent sent with every update request
const USER_AGENT: &str = concat!("freedns-update-http/", env!("CARGO_PKG_VERSION"));

/// Update client for the FreeDNS HTTP API
///
/// One instance serves every entry. Requests carry their own URL, token
/// and deadline, so the client itself holds no credentials and can be
/// shared freely.
#[derive(Debug, Clone)]
pub struct HttpUpdateClient {
    client: reqwest::Client,
}

impl HttpUpdateClient {
    /// Create a new update client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpUpdateClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpdateClient for HttpUpdateClient {
    async fn attempt_update(
        &self,
        url: Option<&str>,
        access_token: Option<&str>,
        timeout: Duration,
    ) -> Result<UpdateOutcome, Error> {
        let target = url.unwrap_or(DEFAULT_UPDATE_URL);
        let parsed = reqwest::Url::parse(target).map_err(|_| Error::invalid_url(target))?;
        let host = parsed
            .host_str()
            .unwrap_or("freedns.afraid.org")
            .to_string();

        tracing::debug!(
            host = %host,
            with_token = access_token.is_some(),
            "sending FreeDNS update"
        );

        let request = match access_token {
            // The token is the query parameter name; the value stays empty.
            Some(token) => self.client.get(parsed).query(&[(token, "")]),
            None => self.client.get(parsed),
        };

        let attempt = async {
            let response = request
                .send()
                .await
                .map_err(|err| Error::http(err.without_url().to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::http(format!(
                    "unexpected status {status} from FreeDNS"
                )));
            }

            response
                .text()
                .await
                .map_err(|err| Error::http(err.without_url().to_string()))
        };

        let body = match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(host = %host, "FreeDNS update timed out");
                return Err(Error::timeout(host, timeout.as_secs()));
            }
        };

        classify_response(body.trim())
    }
}

/// Classify the plain-text body FreeDNS answers with
///
/// Order matters: the no-change notice is itself phrased as an ERROR
/// line, so it is recognized before the general ERROR check.
fn classify_response(body: &str) -> Result<UpdateOutcome, Error> {
    if body.contains("has not changed") || body.contains("No IP change detected") {
        tracing::debug!("FreeDNS update skipped, address has not changed");
        return Ok(UpdateOutcome::Unchanged);
    }

    if !body.contains("ERROR") {
        tracing::debug!(body = %body, "FreeDNS update successful");
        return Ok(UpdateOutcome::Updated {
            message: body.to_string(),
        });
    }

    if body.contains("Invalid update URL") {
        tracing::error!("FreeDNS update token is invalid");
        return Err(Error::InvalidAuth);
    }

    tracing::warn!(body = %body, "FreeDNS update rejected");
    Err(Error::update_rejected(body))
}
