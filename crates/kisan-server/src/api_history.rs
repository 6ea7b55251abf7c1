//! History API handlers.
//!
//! Provides:
//! - `GET /voice/history/{farmer_id}`: one farmer's interactions
//! - `GET /voice/history`: paginated interactions across all farmers

use crate::api::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    Json,
};
use kisan_types::ChatRecord;
use serde::Deserialize;
use std::sync::Arc;

/// Largest page `GET /voice/history` returns.
pub const MAX_PAGE_SIZE: i64 = 1000;

const DEFAULT_PAGE_SIZE: i64 = 100;

/// Query parameters for `GET /voice/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Records to skip (default: 0).
    pub skip: Option<i64>,
    /// Maximum number of records to return (default: 100, max: 1000).
    pub limit: Option<i64>,
}

/// Handler for `GET /voice/history/{farmer_id}`.
///
/// Unknown farmers get an empty list.
pub async fn farmer_history_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(farmer_id): Path<String>,
) -> Result<Json<Vec<ChatRecord>>, ApiError> {
    let records = state.history.list_by_farmer(farmer_id).await?;
    Ok(Json(records))
}

/// Handler for `GET /voice/history`.
pub async fn all_history_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let skip = params.skip.unwrap_or(0);
    // Negative values pass through so the store rejects them.
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let records = state.history.list_all(skip, limit).await?;
    Ok(Json(records))
}
