//! Kisan voice server library logic.

pub mod api;
pub mod api_history;
pub mod api_voice;
pub mod chat;
pub mod config;
pub mod history;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use chat::ChatPipeline;
use history::HistoryStore;
use kisan_db::DbPool;
use kisan_voice::{
    AnswerGenerator, ChatCompletionsClient, GoogleCloudConfig, GoogleRecognizer,
    GoogleSynthesizer, SttService, TtsService, VoiceError,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Which provider credentials are present, for `GET /health`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialStatus {
    pub google_stt: bool,
    pub google_tts: bool,
}

impl CredentialStatus {
    pub fn from_config(google: &GoogleCloudConfig) -> Self {
        Self {
            google_stt: google.stt_key().is_some(),
            google_tts: google.tts_key().is_some(),
        }
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Interaction history.
    pub history: HistoryStore,
    /// STT service.
    pub stt: Arc<SttService>,
    /// TTS service.
    pub tts: Arc<TtsService>,
    /// Chat turn orchestration.
    pub chat: ChatPipeline,
    pub credentials: CredentialStatus,
}

impl AppState {
    /// Wires the services around one pool and one answer generator.
    pub fn new(
        pool: DbPool,
        stt: Arc<SttService>,
        tts: Arc<TtsService>,
        answers: Arc<dyn AnswerGenerator>,
        credentials: CredentialStatus,
    ) -> Self {
        let history = HistoryStore::new(pool);
        let chat = ChatPipeline::new(answers, Arc::clone(&tts), history.clone());
        Self {
            history,
            stt,
            tts,
            chat,
            credentials,
        }
    }

    /// Builds the production providers from configuration.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError` if an HTTP client cannot be built. Missing
    /// credentials are not an error here; they fail the request that needs
    /// them.
    pub fn from_config(pool: DbPool, config: &config::Config) -> Result<Self, VoiceError> {
        let stt = SttService::new(Arc::new(GoogleRecognizer::new(&config.google)?));
        let tts = TtsService::new(Arc::new(GoogleSynthesizer::new(&config.google)?));
        let answers = ChatCompletionsClient::new(config.llm.clone())?;

        Ok(Self::new(
            pool,
            Arc::new(stt),
            Arc::new(tts),
            Arc::new(answers),
            CredentialStatus::from_config(&config.google),
        ))
    }
}

/// Audio arrives base64-encoded inside JSON.
const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root_handler))
        .route("/health", get(api::health_handler))
        .route("/voice/chat", post(api_voice::chat_handler))
        .route("/voice/stt", post(api_voice::stt_handler))
        .route("/voice/tts", post(api_voice::tts_handler))
        .route("/voice/history", get(api_history::all_history_handler))
        .route(
            "/voice/history/{farmer_id}",
            get(api_history::farmer_history_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
