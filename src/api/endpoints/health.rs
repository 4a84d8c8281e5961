//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub patients: usize,
    pub llm_live: bool,
    pub version: &'static str,
}

/// `GET /health` — liveness plus roster size.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        patients: ctx.store.len()?,
        llm_live: ctx.llm_live,
        version: crate::config::APP_VERSION,
    }))
}
