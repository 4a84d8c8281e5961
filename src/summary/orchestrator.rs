//! Triage-summary orchestration: alerts → prompt → model → parse.

use chrono::NaiveDate;

use crate::roster::delay::clinical_alerts;
use crate::roster::Patient;

use super::parser::parse_summary_response;
use super::prompt::{build_summary_prompt, SUMMARY_SYSTEM_PROMPT};
use super::types::{ChatMessage, LlmClient, LlmError, SummaryResult};
use super::SummaryError;

/// Owns the completion client and runs the per-message pipeline.
pub struct SummaryEngine {
    client: Box<dyn LlmClient + Send + Sync>,
}

impl SummaryEngine {
    pub fn new(client: Box<dyn LlmClient + Send + Sync>) -> Self {
        Self { client }
    }

    /// Produce a structured triage summary for one patient message.
    ///
    /// Delay alerts are informational context: the "incomplete diagnostic
    /// data" sentinel does not stop the pipeline. A failed model call
    /// becomes `SummaryError::Upstream` — no automatic retry; malformed
    /// output that survives the repair pass becomes
    /// `SummaryError::Malformed` carrying the raw text.
    pub fn generate(
        &self,
        patient: &Patient,
        message: &str,
        today: NaiveDate,
    ) -> Result<SummaryResult, SummaryError> {
        let alerts = clinical_alerts(patient, today);
        let prompt = build_summary_prompt(patient, message, &alerts);

        let messages = [
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        tracing::debug!(patient = %patient.id, alerts = alerts.len(), "requesting triage summary");
        let raw = self.client.chat(&messages)?;

        parse_summary_response(&raw)
    }

    /// Free-form conversation, for the plain chat endpoint.
    ///
    /// History turns arrive ahead of the current message; blank turns
    /// are dropped.
    pub fn converse(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(
            history
                .iter()
                .filter(|m| !m.content.trim().is_empty())
                .cloned(),
        );
        messages.push(ChatMessage::user(message));

        self.client.chat(&messages)
    }
}
