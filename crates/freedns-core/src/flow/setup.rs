//! Initial setup flow
//!
//! Config collects credentials, Check proves them with one real update
//! attempt in a spawned task, Finish emits the options for the host to
//! persist. The check task is spawned once; while it runs, re-entering
//! the step only re-renders the progress indicator.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{
    ABORT_REASON_CHECK, CHECK_SETTLE_DELAY, ConfigInput, FlowResult, FormError,
    PROGRESS_ACTION_CHECK, StepId, config_schema, normalized, validate_config_input,
};
use crate::Error;
use crate::config::{DEFAULT_ENTRY_TITLE, DEFAULT_SCAN_INTERVAL_MINS, EntryOptions};
use crate::traits::update_client::{UpdateClient, UpdateOutcome};

/// State machine for the initial configuration of an entry
pub struct SetupFlow {
    client: Arc<dyn UpdateClient>,
    options: EntryOptions,
    error: Option<FormError>,
    check_task: Option<JoinHandle<Result<UpdateOutcome, Error>>>,
    settle_delay: Duration,
}

impl SetupFlow {
    /// Start a setup flow using `client` for the background check
    pub fn new(client: Arc<dyn UpdateClient>) -> Self {
        Self {
            client,
            options: EntryOptions::new(),
            error: None,
            check_task: None,
            settle_delay: CHECK_SETTLE_DELAY,
        }
    }

    /// Entry point; identical to [`SetupFlow::step_config`]
    pub async fn step_user(&mut self, input: Option<ConfigInput>) -> FlowResult {
        self.step_config(input).await
    }

    /// Credential form
    ///
    /// Without input, renders the form, carrying any error from the last
    /// submission or check. With input, validates it from scratch: stale
    /// errors never survive a new submission. Valid input advances to
    /// the Check step.
    pub async fn step_config(&mut self, input: Option<ConfigInput>) -> FlowResult {
        let Some(input) = input else {
            return FlowResult::ShowForm {
                step: StepId::Config,
                schema: config_schema(None),
                error: self.error.clone(),
            };
        };

        self.error = validate_config_input(&input);
        if self.error.is_some() {
            return FlowResult::ShowForm {
                step: StepId::Config,
                schema: config_schema(Some(&input)),
                error: self.error.clone(),
            };
        }

        let mut options = EntryOptions::new();
        if let Some(url) = normalized(input.url.as_deref()) {
            options = options.with_url(url);
        }
        if let Some(token) = normalized(input.access_token.as_deref()) {
            options = options.with_access_token(token);
        }
        options = options.with_scan_interval(
            input
                .scan_interval_mins
                .unwrap_or(DEFAULT_SCAN_INTERVAL_MINS),
        );
        self.options = options;

        self.step_check().await
    }

    /// Background check against the service
    ///
    /// The first call spawns the check task and shows progress. While
    /// the task runs, further calls show progress again without spawning
    /// anything. Once it finishes, the outcome decides the next step:
    /// success advances to Finish, a correctable failure records a form
    /// error and returns to Config, a timeout aborts the flow.
    pub async fn step_check(&mut self) -> FlowResult {
        let Some(handle) = self.check_task.take() else {
            let client = Arc::clone(&self.client);
            let options = self.options.clone();
            let settle = self.settle_delay;
            self.check_task = Some(tokio::spawn(async move {
                let outcome = client
                    .attempt_update(
                        options.url.as_deref(),
                        options.access_token.as_deref(),
                        options.request_timeout(),
                    )
                    .await;
                tokio::time::sleep(settle).await;
                outcome
            }));
            return FlowResult::ShowProgress {
                step: StepId::Check,
                progress_action: PROGRESS_ACTION_CHECK,
            };
        };

        if !handle.is_finished() {
            self.check_task = Some(handle);
            return FlowResult::ShowProgress {
                step: StepId::Check,
                progress_action: PROGRESS_ACTION_CHECK,
            };
        }

        match handle.await {
            Err(join_err) => {
                debug!(error = %join_err, "configuration check task failed to complete");
                FlowResult::Abort {
                    reason: ABORT_REASON_CHECK,
                }
            }
            Ok(Err(Error::Timeout { .. })) => FlowResult::Abort {
                reason: ABORT_REASON_CHECK,
            },
            Ok(Err(err)) => {
                self.error = Some(check_error_to_form(err));
                FlowResult::ShowProgressDone {
                    next_step: StepId::Config,
                }
            }
            Ok(Ok(_outcome)) => {
                self.error = None;
                FlowResult::ShowProgressDone {
                    next_step: StepId::Finish,
                }
            }
        }
    }

    /// Terminal step; emits the entry for the host to persist
    pub async fn step_finish(&mut self) -> FlowResult {
        FlowResult::CreateEntry {
            title: DEFAULT_ENTRY_TITLE.to_string(),
            options: self.options.clone(),
        }
    }
}

/// Map a failed check onto the form error shown at the Config step
fn check_error_to_form(err: Error) -> FormError {
    match err {
        Error::InvalidUrl(_) => FormError::InvalidUrl,
        Error::InvalidAuth => FormError::InvalidAuth,
        Error::UpdateRejected(body) => FormError::UpdateFailed(body),
        _ => FormError::CantConnect,
    }
}
