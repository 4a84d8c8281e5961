//! Parse the model's raw text into a [`SummaryResult`].
//!
//! The model is an untrusted text generator: the strict-JSON contract
//! may come back wrapped in prose. Direct parse first, then a repair
//! pass over the first `{` … last `}` substring. When both fail the raw
//! text is surfaced in the error — never dropped.

use serde::Deserialize;

use super::types::{SummaryResult, Urgency};
use super::SummaryError;

/// Wire shape of the model's JSON object.
#[derive(Deserialize)]
struct RawSummary {
    sintomas: Vec<String>,
    pontos_relevantes: Vec<String>,
    sugestao_plano_acao: Vec<String>,
    nivel_urgencia: String,
}

/// Parse, repairing prose-wrapped JSON if needed.
pub fn parse_summary_response(raw: &str) -> Result<SummaryResult, SummaryError> {
    let trimmed = raw.trim();

    let direct = serde_json::from_str::<RawSummary>(trimmed);
    let parsed = match direct {
        Ok(summary) => summary,
        Err(first_err) => match extract_json_object(trimmed) {
            Some(slice) => serde_json::from_str::<RawSummary>(slice).map_err(|e| {
                SummaryError::Malformed {
                    detail: e.to_string(),
                    raw: raw.to_string(),
                }
            })?,
            None => {
                return Err(SummaryError::Malformed {
                    detail: first_err.to_string(),
                    raw: raw.to_string(),
                })
            }
        },
    };

    Ok(normalize(parsed))
}

/// The substring from the first `{` to the last `}`, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn normalize(raw: RawSummary) -> SummaryResult {
    SummaryResult {
        symptoms: trim_all(raw.sintomas),
        relevant_points: trim_all(raw.pontos_relevantes),
        suggested_questions: trim_all(raw.sugestao_plano_acao),
        urgency: Urgency::from_label(&raw.nivel_urgencia),
    }
}

fn trim_all(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.trim().to_string()).collect()
}
