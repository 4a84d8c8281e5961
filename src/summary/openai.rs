//! OpenAI-compatible completion client, plus the no-provider stub.

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

use super::types::{ChatMessage, LlmClient, LlmError};

/// Blocking HTTP client for an OpenAI-compatible `/v1/chat/completions`
/// endpoint. One bounded round trip per call, no automatic retry.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            client,
        }
    }
}

/// Request body for `/v1/chat/completions`.
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl LlmClient for OpenAiClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Decode(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        Ok(choice.message.content)
    }
}

/// Deterministic stand-in used when no provider is configured.
///
/// Returns a canned, contract-shaped JSON object so the summary
/// pipeline stays exercisable end to end without credentials.
pub struct StubClient;

/// Canned stub output — valid against the four-key contract.
pub const STUB_SUMMARY_JSON: &str = r#"{"sintomas":[],"pontos_relevantes":["Resumo gerado sem provedor de IA configurado."],"sugestao_plano_acao":["Como o paciente está se sentindo desde a última consulta?","Houve algum sintoma novo desde a última mensagem?"],"nivel_urgencia":"Baixa"}"#;

impl LlmClient for StubClient {
    fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Ok(STUB_SUMMARY_JSON.to_string())
    }
}
