//! Voice API handlers.
//!
//! Provides:
//! - `POST /voice/chat`: answer a question and speak the answer
//! - `POST /voice/stt`: transcribe base64 audio
//! - `POST /voice/tts`: synthesize base64 MP3

use crate::api::ApiError;
use crate::chat::ChatTurn;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use kisan_types::{default_farmer_id, default_farmer_name, default_language};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_farmer_name_opt() -> Option<String> {
    Some(default_farmer_name())
}

/// Request body for `POST /voice/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The farmer's question.
    pub message: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_farmer_id")]
    pub farmer_id: String,
    #[serde(default = "default_farmer_name_opt")]
    pub farmer_name: Option<String>,
}

/// Response body for `POST /voice/chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Base64 MP3 of `response`.
    pub audio: String,
    pub farmer_id: String,
    /// `false` when the interaction could not be stored.
    pub saved: bool,
}

/// Request body for `POST /voice/stt`.
#[derive(Debug, Deserialize)]
pub struct SttRequest {
    /// Base64 audio, optionally as a data URI.
    pub audio: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Response body for `POST /voice/stt`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SttResponse {
    pub text: String,
    pub confidence: f32,
}

/// Request body for `POST /voice/tts`.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Response body for `POST /voice/tts`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TtsResponse {
    pub audio: String,
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Handler for `POST /voice/chat`.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    require_text("message", &payload.message)?;

    let outcome = state
        .chat
        .run(ChatTurn {
            question: payload.message,
            language: payload.language,
            farmer_id: payload.farmer_id,
            farmer_name: payload.farmer_name,
        })
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        audio: outcome.audio,
        farmer_id: outcome.farmer_id,
        saved: outcome.saved,
    }))
}

/// Handler for `POST /voice/stt`.
pub async fn stt_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<SttRequest>, JsonRejection>,
) -> Result<Json<SttResponse>, ApiError> {
    let Json(payload) = payload?;

    let transcription = state
        .stt
        .transcribe(&payload.audio, &payload.language)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, language = %payload.language, "transcription failed")
        })?;

    Ok(Json(SttResponse {
        text: transcription.text,
        confidence: transcription.confidence,
    }))
}

/// Handler for `POST /voice/tts`.
pub async fn tts_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Json<TtsResponse>, ApiError> {
    let Json(payload) = payload?;
    require_text("text", &payload.text)?;

    let audio = state
        .tts
        .synthesize(&payload.text, &payload.language)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, language = %payload.language, "synthesis failed")
        })?;

    Ok(Json(TtsResponse { audio }))
}
