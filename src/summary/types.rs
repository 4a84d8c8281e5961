//! Shared types for the triage-summary pipeline.

use serde::{Deserialize, Serialize};

/// Urgency classification the model must pick from.
///
/// Wire labels are the Portuguese ones the clinician dashboard expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "Baixa")]
    Baixa,
    #[serde(rename = "Média")]
    Media,
    #[serde(rename = "Alta")]
    Alta,
}

impl Urgency {
    /// Lenient label parsing — accent- and case-tolerant.
    ///
    /// An unrecognized label normalizes to `Media`: neither silently
    /// dismissed nor escalated.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "baixa" => Urgency::Baixa,
            "alta" => Urgency::Alta,
            "média" | "media" => Urgency::Media,
            _ => Urgency::Media,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Baixa => "Baixa",
            Urgency::Media => "Média",
            Urgency::Alta => "Alta",
        }
    }
}

/// Structured triage extracted from one patient message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub symptoms: Vec<String>,
    pub relevant_points: Vec<String>,
    pub suggested_questions: Vec<String>,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of an OpenAI-style conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("cannot reach LLM provider at {0}")]
    Connection(String),
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),
    #[error("LLM provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("failed to decode LLM response: {0}")]
    Decode(String),
    #[error("LLM response contained no choices")]
    EmptyResponse,
}

/// Abstraction over the completion provider.
///
/// Implementations are synchronous (blocking HTTP with a bounded
/// timeout); async callers hop through `spawn_blocking`.
pub trait LlmClient {
    /// Send a conversation, return the assistant's raw text.
    fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}
