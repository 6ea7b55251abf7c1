//! Voice and answer adapters for the Kisan voice backend.
//!
//! Wraps the three remote providers a chat turn depends on:
//!
//! - [`SttService`] turns base64 audio into text. It drops silence before
//!   any remote call and falls back from the enhanced recognition model to
//!   the default one when the provider rejects the first attempt.
//! - [`TtsService`] turns text into base64 MP3, choosing the voice from the
//!   language tag.
//! - [`AnswerGenerator`] turns a question into an answer.
//!
//! Each provider sits behind a small `async_trait` so the services can be
//! driven by the Google Cloud / OpenAI-compatible HTTP clients in
//! production and by in-process fakes in tests.

pub mod answer;
pub mod config;
pub mod error;
pub mod google;
pub mod stt;
pub mod tts;

use std::time::Duration;

pub use answer::{system_prompt, AnswerGenerator, ChatCompletionsClient};
pub use config::{GoogleCloudConfig, LlmConfig};
pub use error::VoiceError;
pub use google::{GoogleRecognizer, GoogleSynthesizer};
pub use stt::{
    RecognitionModel, RecognitionRequest, RecognitionResponse, SpeechRecognizer, SttService,
    Transcription, MIN_AUDIO_BYTES,
};
pub use tts::{SpeechSynthesizer, SynthesisRequest, TtsService, AUDIO_SETTINGS};

/// Builds a `reqwest` client whose requests give up after `timeout`.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(concat!("kisan-voice/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| format!("failed to build HTTP client: {}", e))
}

/// Returns at most `max_chars` characters of `text`, marking truncation.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
