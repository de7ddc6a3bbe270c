//! Options edit flow
//!
//! Edits the scan interval of an existing entry. Only the interval is
//! exposed; credentials stay as they were configured. No service check
//! runs here: a bad interval is caught by validation alone, so the flow
//! is a single form followed by Finish.

use super::{FlowResult, FormError, OptionsInput, StepId, options_schema};
use crate::config::{
    ConfigEntry, DEFAULT_ENTRY_TITLE, EntryId, EntryOptions, MIN_SCAN_INTERVAL_MINS,
};

/// State machine for editing an entry's options
pub struct OptionsFlow {
    entry_id: EntryId,
    options: EntryOptions,
    error: Option<FormError>,
}

impl OptionsFlow {
    /// Start an options flow for an existing entry
    pub fn new(entry: &ConfigEntry) -> Self {
        Self {
            entry_id: entry.id.clone(),
            options: entry.options.clone(),
            error: None,
        }
    }

    /// Entry the flow edits
    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    /// Entry point; identical to [`OptionsFlow::step_options`]
    pub async fn step_init(&mut self, input: Option<OptionsInput>) -> FlowResult {
        self.step_options(input).await
    }

    /// Interval form
    ///
    /// The schema seeds its default from the entry's current interval.
    /// An omitted submission keeps the current value; a value below the
    /// minimum re-renders the form with an error.
    pub async fn step_options(&mut self, input: Option<OptionsInput>) -> FlowResult {
        if let Some(input) = input {
            let interval = input
                .scan_interval_mins
                .unwrap_or(self.options.scan_interval_mins);
            if interval < MIN_SCAN_INTERVAL_MINS {
                self.error = Some(FormError::BelowMinimumScanInterval);
            } else {
                self.error = None;
                self.options.scan_interval_mins = interval;
                return self.step_finish().await;
            }
        }

        FlowResult::ShowForm {
            step: StepId::Options,
            schema: options_schema(self.options.scan_interval_mins),
            error: self.error.clone(),
        }
    }

    /// Terminal step; emits the merged options for the host to persist
    pub async fn step_finish(&mut self) -> FlowResult {
        FlowResult::CreateEntry {
            title: DEFAULT_ENTRY_TITLE.to_string(),
            options: self.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry_with_interval(mins: u32) -> ConfigEntry {
        ConfigEntry {
            id: EntryId::from("entry-1"),
            title: DEFAULT_ENTRY_TITLE.to_string(),
            options: EntryOptions::new()
                .with_access_token("tok123")
                .with_scan_interval(mins),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn form_seeds_default_from_current_interval() {
        let mut flow = OptionsFlow::new(&entry_with_interval(15));
        let result = flow.step_init(None).await;

        let FlowResult::ShowForm { step, schema, error } = result else {
            panic!("expected a form, got {result:?}");
        };
        assert_eq!(step, StepId::Options);
        assert!(error.is_none());
        assert_eq!(schema.fields[0].default.as_deref(), Some("15"));
    }

    #[tokio::test]
    async fn interval_below_minimum_rerenders_with_error() {
        let mut flow = OptionsFlow::new(&entry_with_interval(15));
        let result = flow
            .step_options(Some(OptionsInput::new().with_scan_interval(4)))
            .await;

        let FlowResult::ShowForm { schema, error, .. } = result else {
            panic!("expected a form, got {result:?}");
        };
        assert_eq!(error, Some(FormError::BelowMinimumScanInterval));
        assert_eq!(
            schema.fields[0].default.as_deref(),
            Some("15"),
            "a rejected value must not change the seeded default"
        );
    }

    #[tokio::test]
    async fn accepted_interval_merges_into_existing_options() {
        let mut flow = OptionsFlow::new(&entry_with_interval(15));
        let result = flow
            .step_options(Some(OptionsInput::new().with_scan_interval(5)))
            .await;

        let FlowResult::CreateEntry { title, options } = result else {
            panic!("expected entry creation, got {result:?}");
        };
        assert_eq!(title, "FreeDNS");
        assert_eq!(options.scan_interval_mins, 5);
        assert_eq!(options.access_token.as_deref(), Some("tok123"));
        assert_eq!(options.timeout_secs, 10);
    }

    #[tokio::test]
    async fn omitted_interval_keeps_the_current_value() {
        let mut flow = OptionsFlow::new(&entry_with_interval(15));
        let result = flow.step_options(Some(OptionsInput::new())).await;

        let FlowResult::CreateEntry { options, .. } = result else {
            panic!("expected entry creation, got {result:?}");
        };
        assert_eq!(options.scan_interval_mins, 15);
    }

    #[tokio::test]
    async fn error_clears_after_a_valid_submission() {
        let mut flow = OptionsFlow::new(&entry_with_interval(15));
        flow.step_options(Some(OptionsInput::new().with_scan_interval(1)))
            .await;
        let result = flow
            .step_options(Some(OptionsInput::new().with_scan_interval(30)))
            .await;
        assert!(matches!(result, FlowResult::CreateEntry { .. }));
    }
}
