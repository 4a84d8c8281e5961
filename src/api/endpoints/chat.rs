//! Chat endpoints.
//!
//! Two surfaces over the same engine:
//! - `POST /chat` — free-form conversation with optional patient context;
//!   degrades to a local stub answer when the provider is absent or down.
//! - `POST /chat/summary` — the structured triage pipeline. Upstream and
//!   malformed-output failures are recovered into an error-shaped body
//!   (never a transport error) so the dashboard can audit the raw text.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::roster::Patient;
use crate::summary::{format_context, ChatMessage, SummaryEngine, SummaryError, SummaryResult};

/// Upper bound on one patient message, in characters.
const MAX_MESSAGE_CHARS: usize = 2000;

const CHAT_SYSTEM_PROMPT: &str = "Você é um assistente para jornada oncológica. Responda de \
     forma clara, curta e útil. Se a pergunta exigir opinião médica, lembre que isso não \
     substitui o médico responsável.";

// ── Free-form chat ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub patient_id: Option<String>,
    pub history: Option<Vec<ChatMessage>>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub used_llm: bool,
}

/// `POST /chat` — conversational answer with optional patient context.
pub async fn chat(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = validate_message(&req.message)?;

    let patient_context = match &req.patient_id {
        Some(id) => {
            let patient = lookup(&ctx, id)?;
            Some(format_context(&patient))
        }
        None => None,
    };

    let mut system = CHAT_SYSTEM_PROMPT.to_string();
    if let Some(context) = &patient_context {
        system.push_str("\nContexto do paciente (somente para referência): ");
        system.push_str(context);
    }

    if !ctx.llm_live {
        return Ok(Json(stub_answer(&message, patient_context.as_deref())));
    }

    let engine = Arc::clone(&ctx.engine);
    let history = req.history.unwrap_or_default();
    let call_message = message.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.converse(&system, &history, &call_message)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("chat task failed: {e}")))?;

    match outcome {
        Ok(answer) => Ok(Json(ChatResponse {
            answer: answer.trim().to_string(),
            used_llm: true,
        })),
        Err(err) => {
            tracing::warn!(error = %err, "LLM chat failed, degrading to stub answer");
            Ok(Json(stub_answer(&message, patient_context.as_deref())))
        }
    }
}

fn stub_answer(message: &str, patient_context: Option<&str>) -> ChatResponse {
    let mut answer = String::from(
        "Não consegui acessar o modelo de IA agora; respondendo em modo de teste.\n",
    );
    if let Some(context) = patient_context {
        answer.push_str(&format!("Contexto: {context}\n"));
    }
    answer.push_str(&format!("Você perguntou: \u{201c}{message}\u{201d}."));
    ChatResponse {
        answer,
        used_llm: false,
    }
}

// ── Structured triage summary ───────────────────────────────

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub patient_id: String,
    pub message: String,
    /// Accepted for interface compatibility; the triage prompt is built
    /// from the roster record and the current message only.
    #[allow(dead_code)]
    pub history: Option<Vec<ChatMessage>>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub patient_id: String,
    pub alerts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SummaryFailure>,
}

/// Error-shaped summary outcome, kept auditable.
#[derive(Serialize)]
pub struct SummaryFailure {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

/// `POST /chat/summary` — structured triage of one patient message.
///
/// Unknown patient id is a 404 and no model call is attempted.
pub async fn summary(
    State(ctx): State<ApiContext>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    if req.patient_id.trim().is_empty() {
        return Err(ApiError::BadRequest("patient_id is required".into()));
    }
    let message = validate_message(&req.message)?;

    let patient = lookup(&ctx, &req.patient_id)?;
    let today = Utc::now().date_naive();
    let alerts = crate::roster::delay::clinical_alerts(&patient, today);

    let engine: Arc<SummaryEngine> = Arc::clone(&ctx.engine);
    let outcome = tokio::task::spawn_blocking(move || {
        engine.generate(&patient, &message, today)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("summary task failed: {e}")))?;

    let response = match outcome {
        Ok(summary) => SummaryResponse {
            patient_id: req.patient_id,
            alerts,
            summary: Some(summary),
            error: None,
        },
        Err(err) => {
            tracing::warn!(patient = %req.patient_id, error = %err, "triage summary failed");
            let failure = SummaryFailure {
                code: match err {
                    SummaryError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
                    SummaryError::Malformed { .. } => "MALFORMED_RESPONSE",
                },
                message: err.to_string(),
                raw_output: err.raw_output().map(str::to_string),
            };
            SummaryResponse {
                patient_id: req.patient_id,
                alerts,
                summary: None,
                error: Some(failure),
            }
        }
    };

    Ok(Json(response))
}

// ── Shared helpers ──────────────────────────────────────────

fn validate_message(message: &str) -> Result<String, ApiError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("message cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }
    Ok(trimmed.to_string())
}

fn lookup(ctx: &ApiContext, id: &str) -> Result<Patient, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("patient `{id}` not found")))
}
