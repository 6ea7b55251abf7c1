//! Shared API error type and the service-level handlers.

use crate::history::StoreError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kisan_db::HistoryError;
use kisan_voice::VoiceError;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
///
/// Every variant renders as `{"error": <detail>, "code": <category>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl ApiError {
    /// Machine-readable category for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::Configuration(_) => "configuration_error",
            ApiError::Provider(_) => "provider_error",
            ApiError::InternalServerError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Provider(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::InvalidAudio(_) => ApiError::BadRequest(err.to_string()),
            VoiceError::MissingCredential(_) => ApiError::Configuration(err.to_string()),
            VoiceError::Stt(_) | VoiceError::Tts(_) | VoiceError::Llm(_) => {
                ApiError::Provider(err.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::History(HistoryError::InvalidPagination(msg)) => ApiError::BadRequest(msg),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Handler for `GET /`.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Kisan Vani voice assistant API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "POST /voice/chat",
            "stt": "POST /voice/stt",
            "tts": "POST /voice/tts",
            "history": "GET /voice/history/{farmer_id}",
            "all_history": "GET /voice/history?skip=0&limit=100",
            "health": "GET /health",
        }
    }))
}

/// Handler for `GET /health`.
///
/// Always answers `200`; the database and credential fields report
/// readiness without failing the check.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let database = match state.history.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "health check could not reach the database");
            "unavailable"
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "api_keys": {
            "google_tts": state.credentials.google_tts,
            "google_stt": state.credentials.google_stt,
        }
    }))
}
