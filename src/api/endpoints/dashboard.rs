//! Dashboard counters.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::roster::DelayStats;

/// `GET /dashboard/alerts` — roster-wide delay counters.
pub async fn alerts(State(ctx): State<ApiContext>) -> Result<Json<DelayStats>, ApiError> {
    Ok(Json(ctx.store.delay_stats()?))
}
