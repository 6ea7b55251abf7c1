use crate::error::VoiceError;
use async_trait::async_trait;
use kisan_types::{voice_profile_for, VoiceProfile};
use serde::Serialize;
use std::sync::Arc;

/// Output settings for synthesis. Fixed for every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    pub audio_encoding: &'static str,
    pub speaking_rate: f32,
    pub pitch: f32,
}

/// MP3 at a slightly slowed speaking rate, neutral pitch.
pub const AUDIO_SETTINGS: AudioSettings = AudioSettings {
    audio_encoding: "MP3",
    speaking_rate: 0.9,
    pitch: 0.0,
};

/// A single synthesis call.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub voice: VoiceProfile,
    pub audio: AudioSettings,
}

/// A remote speech synthesizer.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Fails with [`VoiceError::MissingCredential`] when the synthesizer
    /// cannot be called at all.
    fn ensure_configured(&self) -> Result<(), VoiceError> {
        Ok(())
    }

    /// Returns base64-encoded audio. Provider failures are [`VoiceError::Tts`].
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String, VoiceError>;
}

/// Service for generating speech from text.
///
/// Picks the voice for the request's language tag; unsupported tags use the
/// default voice. Provider failures are not retried.
#[derive(Clone)]
pub struct TtsService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl std::fmt::Debug for TtsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsService").finish_non_exhaustive()
    }
}

impl TtsService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Synthesizes `text` in the voice for `language`.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<String, VoiceError> {
        self.synthesizer.ensure_configured()?;

        let voice = voice_profile_for(language);
        if voice.language_code != language {
            tracing::debug!(
                requested = language,
                voice = voice.name,
                "unsupported language tag, using default voice"
            );
        }

        let request = SynthesisRequest {
            text,
            voice,
            audio: AUDIO_SETTINGS,
        };

        let audio = self.synthesizer.synthesize(&request).await?;
        tracing::info!(
            voice = voice.name,
            chars = text.chars().count(),
            audio_len = audio.len(),
            "synthesis succeeded"
        );
        Ok(audio)
    }
}
