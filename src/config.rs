//! Environment-driven configuration.
//!
//! Everything has a sensible local default so `cargo run` works out of
//! the box; the stub LLM client is used until `OPENAI_API_KEY` is set.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "jornada";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the HTTP API.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// Default roster snapshot path, relative to the working directory.
pub const DEFAULT_ROSTER_PATH: &str = "data/jornada_oncologica.csv";

/// Default OpenAI-compatible endpoint base.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";

/// Default completion model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Low temperature — triage output should be near-deterministic.
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.3;

/// Bounded output length for one triage response.
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 400;

/// Wall-clock bound on one LLM round trip, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Default log filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("info,{APP_NAME}=debug")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address `{value}` in {var}")]
    InvalidAddr { var: &'static str, value: String },
    #[error("invalid integer `{value}` in {var}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings for the OpenAI-compatible completion client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `None` selects the stub client — summaries still work, deterministically.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

/// Full process configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub roster_path: PathBuf,
    pub llm: LlmConfig,
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// Variables: `JORNADA_ADDR`, `JORNADA_ROSTER`, `OPENAI_API_KEY`,
    /// `OPENAI_BASE_URL`, `JORNADA_MODEL`, `JORNADA_LLM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr_raw = env_or("JORNADA_ADDR", DEFAULT_ADDR);
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr {
                var: "JORNADA_ADDR",
                value: addr_raw.clone(),
            })?;

        let roster_path = PathBuf::from(env_or("JORNADA_ROSTER", DEFAULT_ROSTER_PATH));

        let timeout_raw = env_or_u64("JORNADA_LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?;

        let llm = LlmConfig {
            api_key: non_empty(std::env::var("OPENAI_API_KEY").ok()),
            base_url: env_or("OPENAI_BASE_URL", DEFAULT_LLM_BASE_URL),
            model: env_or("JORNADA_MODEL", DEFAULT_LLM_MODEL),
            temperature: DEFAULT_LLM_TEMPERATURE,
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            timeout_secs: timeout_raw,
        };

        Ok(Config {
            addr,
            roster_path,
            llm,
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    match non_empty(std::env::var(var).ok()) {
        Some(v) => v,
        None => default.to_string(),
    }
}

fn env_or_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match non_empty(std::env::var(var).ok()) {
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
        None => Ok(default),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
