use crate::error::VoiceError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::sync::Arc;

/// Decoded payloads smaller than this are treated as silence and never sent
/// to the provider.
pub const MIN_AUDIO_BYTES: usize = 4000;

/// One acoustic-model configuration to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionModel {
    pub model: String,
    pub use_enhanced: bool,
    pub enable_word_confidence: bool,
    pub max_alternatives: Option<u32>,
}

impl RecognitionModel {
    /// Enhanced long-form model with word confidence and a single alternative.
    pub fn enhanced_long() -> Self {
        Self {
            model: "latest_long".to_string(),
            use_enhanced: true,
            enable_word_confidence: true,
            max_alternatives: Some(1),
        }
    }

    /// Provider default model with baseline settings.
    pub fn baseline() -> Self {
        Self {
            model: "default".to_string(),
            use_enhanced: false,
            enable_word_confidence: false,
            max_alternatives: None,
        }
    }

    /// The models tried in order: enhanced first, then the baseline.
    pub fn fallback_chain() -> Vec<Self> {
        vec![Self::enhanced_long(), Self::baseline()]
    }
}

/// A single recognition call.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionRequest<'a> {
    /// Base64 audio with any data-URI prefix already removed.
    pub audio_base64: &'a str,
    pub language: &'a str,
    pub model: &'a RecognitionModel,
}

/// Provider reply, shaped like the Google `speech:recognize` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub results: Vec<RecognitionResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// A remote speech recognizer.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Fails with [`VoiceError::MissingCredential`] when the recognizer
    /// cannot be called at all.
    fn ensure_configured(&self) -> Result<(), VoiceError> {
        Ok(())
    }

    /// Performs one recognition call. Any provider-side failure, including
    /// a non-success status, is returned as [`VoiceError::Stt`].
    async fn recognize(
        &self,
        request: &RecognitionRequest<'_>,
    ) -> Result<RecognitionResponse, VoiceError>;
}

/// Result of a transcription. Empty text means no speech was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub confidence: f32,
}

impl Transcription {
    pub fn silence() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<RecognitionResponse> for Transcription {
    fn from(response: RecognitionResponse) -> Self {
        response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.alternatives.into_iter().next())
            .map(|top| Self {
                text: top.transcript,
                confidence: top.confidence.unwrap_or(0.0),
            })
            .unwrap_or_else(Self::silence)
    }
}

/// Turns encoded audio into text, falling back through recognition models.
#[derive(Clone)]
pub struct SttService {
    recognizer: Arc<dyn SpeechRecognizer>,
    models: Vec<RecognitionModel>,
}

impl std::fmt::Debug for SttService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SttService")
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

impl SttService {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer,
            models: RecognitionModel::fallback_chain(),
        }
    }

    /// Replaces the model chain.
    pub fn with_models(mut self, models: Vec<RecognitionModel>) -> Self {
        self.models = models;
        self
    }

    /// Transcribes base64 audio, optionally carrying a data-URI prefix.
    ///
    /// Returns [`Transcription::silence`] without calling the provider when
    /// the decoded audio is shorter than [`MIN_AUDIO_BYTES`].
    pub async fn transcribe(
        &self,
        audio: &str,
        language: &str,
    ) -> Result<Transcription, VoiceError> {
        self.recognizer.ensure_configured()?;

        let payload = strip_whitespace(strip_data_uri(audio));
        let audio_base64 = payload.as_str();
        let decoded = STANDARD
            .decode(audio_base64)
            .map_err(|e| VoiceError::InvalidAudio(e.to_string()))?;

        tracing::debug!(
            language,
            encoded_len = audio_base64.len(),
            decoded_len = decoded.len(),
            "decoded audio payload"
        );

        if decoded.len() < MIN_AUDIO_BYTES {
            tracing::info!(
                decoded_len = decoded.len(),
                "audio below minimum size, treating as silence"
            );
            return Ok(Transcription::silence());
        }

        let mut last_error = None;
        for (attempt, model) in self.models.iter().enumerate() {
            let request = RecognitionRequest {
                audio_base64,
                language,
                model,
            };

            match self.recognizer.recognize(&request).await {
                Ok(response) => {
                    let transcription = Transcription::from(response);
                    if transcription.is_empty() {
                        tracing::info!(model = %model.model, "no speech detected");
                    } else {
                        tracing::info!(
                            model = %model.model,
                            confidence = transcription.confidence,
                            "transcription succeeded"
                        );
                    }
                    return Ok(transcription);
                }
                Err(e) if e.is_provider_error() => {
                    tracing::warn!(
                        model = %model.model,
                        attempt = attempt + 1,
                        error = %e,
                        "recognition attempt failed"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| VoiceError::Stt("no recognition models configured".to_string())))
    }
}

/// Drops a `data:<mime>;base64,` prefix, keeping what follows the first comma.
pub fn strip_data_uri(audio: &str) -> &str {
    match audio.split_once(',') {
        Some((_, payload)) => payload,
        None => audio,
    }
}

/// Removes ASCII whitespace, so MIME line-wrapped base64 decodes.
fn strip_whitespace(payload: &str) -> String {
    payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect()
}
