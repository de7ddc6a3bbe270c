//! Configuration wizard flows
//!
//! Two host-driven state machines configure entries:
//!
//! - [`SetupFlow`]: Config -> Check -> Finish. Collects credentials,
//!   proves them against the service with a background check, then emits
//!   the options to persist.
//! - [`OptionsFlow`]: Options -> Finish. Edits the scan interval of an
//!   existing entry.
//!
//! Flows never touch a store themselves. Each step returns a
//! [`FlowResult`] telling the host what to render or commit next.

pub mod options;
pub mod setup;

pub use options::OptionsFlow;
pub use setup::SetupFlow;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::config::{DEFAULT_SCAN_INTERVAL_MINS, EntryOptions, host_within_required_domain};

/// Progress action reported while the background check runs
pub const PROGRESS_ACTION_CHECK: &str = "task_check";

/// Abort reason for a check that cannot be recovered within the flow
pub const ABORT_REASON_CHECK: &str = "abort_check";

/// Pause after the background check so the progress step stays visible
pub const CHECK_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Field name for the custom update URL
pub const FIELD_URL: &str = "url";

/// Field name for the update token
pub const FIELD_ACCESS_TOKEN: &str = "access_token";

/// Field name for the scan interval
pub const FIELD_SCAN_INTERVAL: &str = "scan_interval_mins";

/// Steps a flow can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Credential form of the setup flow
    Config,
    /// Background check of the setup flow
    Check,
    /// Terminal step emitting the entry
    Finish,
    /// Interval form of the options flow
    Options,
}

impl StepId {
    /// Step identifier as shown to hosts
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Config => "config",
            StepId::Check => "check",
            StepId::Finish => "finish",
            StepId::Options => "options",
        }
    }
}

/// Validation or check failure shown on a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Both or neither of URL and access token were provided
    UrlAccessExclusive,
    /// The URL does not parse or belongs to a foreign host
    InvalidUrl,
    /// The scan interval is below the allowed minimum
    BelowMinimumScanInterval,
    /// The service could not be reached
    CantConnect,
    /// The service rejected the update token
    InvalidAuth,
    /// The service refused the update; carries the response body
    UpdateFailed(String),
}

impl FormError {
    /// Stable error code for host-side presentation
    pub fn code(&self) -> &'static str {
        match self {
            FormError::UrlAccessExclusive => "url_access_exclusive",
            FormError::InvalidUrl => "invalid_url",
            FormError::BelowMinimumScanInterval => "below_minimum_scan_interval",
            FormError::CantConnect => "cant_connect",
            FormError::InvalidAuth => "invalid_auth",
            FormError::UpdateFailed(_) => "update_failed",
        }
    }

    /// Extra diagnostic text, if the error carries any
    pub fn detail(&self) -> Option<&str> {
        match self {
            FormError::UpdateFailed(body) => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.code(), detail),
            None => f.write_str(self.code()),
        }
    }
}

/// Kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text
    Text,
    /// Positive integer
    PositiveInt,
}

/// One field of a form schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// Field name
    pub name: &'static str,
    /// Field kind
    pub kind: FieldKind,
    /// Whether the host must collect a value
    pub required: bool,
    /// Prefilled value, if any
    pub default: Option<String>,
}

/// Schema of a form the host should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    /// Step the form belongs to
    pub step: StepId,
    /// Fields to render, in order
    pub fields: Vec<FormField>,
}

/// User input submitted to the setup flow's Config step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInput {
    /// Custom update URL
    pub url: Option<String>,
    /// Update token
    pub access_token: Option<String>,
    /// Scan interval in minutes; `None` means the schema default
    pub scan_interval_mins: Option<u32>,
}

impl ConfigInput {
    /// Empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the custom update URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the update token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the scan interval in minutes
    pub fn with_scan_interval(mut self, mins: u32) -> Self {
        self.scan_interval_mins = Some(mins);
        self
    }
}

/// User input submitted to the options flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsInput {
    /// Scan interval in minutes; `None` means the schema default
    pub scan_interval_mins: Option<u32>,
}

impl OptionsInput {
    /// Empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan interval in minutes
    pub fn with_scan_interval(mut self, mins: u32) -> Self {
        self.scan_interval_mins = Some(mins);
        self
    }
}

/// What the host should do after a flow step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// Render a form, optionally with a validation error
    ShowForm {
        /// Step being shown
        step: StepId,
        /// Schema to render
        schema: FormSchema,
        /// Error from the last submission, if any
        error: Option<FormError>,
    },
    /// Render a progress indicator and poke the step again later
    ShowProgress {
        /// Step being shown
        step: StepId,
        /// Identifier of the running action
        progress_action: &'static str,
    },
    /// Progress finished; advance to the named step
    ShowProgressDone {
        /// Step to advance to
        next_step: StepId,
    },
    /// Persist an entry with these options
    CreateEntry {
        /// Entry title
        title: String,
        /// Options to persist
        options: EntryOptions,
    },
    /// Stop the flow entirely
    Abort {
        /// Stable abort reason
        reason: &'static str,
    },
}

/// Treat empty or whitespace-only submissions as absent
pub(crate) fn normalized(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Validate Config-step input
///
/// Checks run in a fixed order on every submission and the first failure
/// wins: credential exclusivity, then URL host, then interval minimum.
pub(crate) fn validate_config_input(input: &ConfigInput) -> Option<FormError> {
    let url = normalized(input.url.as_deref());
    let token = normalized(input.access_token.as_deref());

    if url.is_some() == token.is_some() {
        return Some(FormError::UrlAccessExclusive);
    }

    if let Some(url) = url {
        if !host_within_required_domain(url) {
            return Some(FormError::InvalidUrl);
        }
    }

    let interval = input
        .scan_interval_mins
        .unwrap_or(DEFAULT_SCAN_INTERVAL_MINS);
    if interval < crate::config::MIN_SCAN_INTERVAL_MINS {
        return Some(FormError::BelowMinimumScanInterval);
    }

    None
}

/// Schema of the Config step, seeding the interval from prior input
pub(crate) fn config_schema(prior: Option<&ConfigInput>) -> FormSchema {
    let interval_default = prior
        .and_then(|input| input.scan_interval_mins)
        .unwrap_or(DEFAULT_SCAN_INTERVAL_MINS);

    FormSchema {
        step: StepId::Config,
        fields: vec![
            FormField {
                name: FIELD_URL,
                kind: FieldKind::Text,
                required: false,
                default: None,
            },
            FormField {
                name: FIELD_ACCESS_TOKEN,
                kind: FieldKind::Text,
                required: false,
                default: None,
            },
            FormField {
                name: FIELD_SCAN_INTERVAL,
                kind: FieldKind::PositiveInt,
                required: false,
                default: Some(interval_default.to_string()),
            },
        ],
    }
}

/// Schema of the Options step, seeding the interval from current options
pub(crate) fn options_schema(current_interval_mins: u32) -> FormSchema {
    FormSchema {
        step: StepId::Options,
        fields: vec![FormField {
            name: FIELD_SCAN_INTERVAL,
            kind: FieldKind::PositiveInt,
            required: false,
            default: Some(current_interval_mins.to_string()),
        }],
    }
}
