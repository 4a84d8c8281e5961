//! Patient roster endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::roster::{Patient, PatientPatch, SearchFilter};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Deserialize)]
pub struct ListQuery {
    /// Name contains, case-insensitive.
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub cancer_type: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub only_delayed: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// `GET /patients` — roster in row order, with name filter and slicing.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let filter = SearchFilter {
        q: query.q,
        limit: clamp_limit(query.limit),
        offset: query.offset.unwrap_or(0),
        ..Default::default()
    };
    Ok(Json(ctx.store.search(&filter)?))
}

/// `GET /patients/search` — composable roster filters.
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let filter = SearchFilter {
        q: query.q,
        cancer_type: query.cancer_type,
        status: query.status,
        only_delayed: query.only_delayed,
        limit: clamp_limit(query.limit),
        offset: query.offset.unwrap_or(0),
    };
    Ok(Json(ctx.store.search(&filter)?))
}

/// `GET /patients/cancer-types` — distinct cancer types in the roster.
pub async fn cancer_types(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(ctx.store.cancer_types()?))
}

/// `GET /patients/:id` — one record.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    match ctx.store.get(&id)? {
        Some(patient) => Ok(Json(patient)),
        None => Err(ApiError::NotFound(format!("patient `{id}` not found"))),
    }
}

/// `PATCH /patients/:id` — field-level update of `oncology.*`/`care.*`.
///
/// Unknown fields are rejected at deserialization (422).
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(patch): Json<PatientPatch>,
) -> Result<Json<Patient>, ApiError> {
    let updated = ctx.store.patch(&id, &patch)?;
    Ok(Json(updated))
}
