//! Triage-summary pipeline: delay alerts, prompt assembly, the LLM
//! call and response repair.

pub mod context;
pub mod openai;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use context::format_context;
pub use openai::{OpenAiClient, StubClient};
pub use orchestrator::SummaryEngine;
pub use parser::parse_summary_response;
pub use types::{ChatMessage, LlmClient, LlmError, Role, SummaryResult, Urgency};

use crate::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("LLM call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("could not extract structured data from model output: {detail}")]
    Malformed { detail: String, raw: String },
}

impl SummaryError {
    /// The offending model output, when there was one.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            SummaryError::Malformed { raw, .. } => Some(raw),
            SummaryError::Upstream(_) => None,
        }
    }
}

/// Select the completion client for the resolved configuration.
///
/// No API key means the stub — the pipeline stays usable, loudly
/// degraded, instead of failing at startup.
pub fn client_from_config(config: &LlmConfig) -> Box<dyn LlmClient + Send + Sync> {
    match &config.api_key {
        Some(key) => Box::new(OpenAiClient::new(config, key)),
        None => {
            tracing::warn!("no OPENAI_API_KEY configured; using the stub summary client");
            Box::new(StubClient)
        }
    }
}
