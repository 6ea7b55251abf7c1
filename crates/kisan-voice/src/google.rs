//! HTTP clients for Google Cloud Speech-to-Text and Text-to-Speech.
//!
//! Both authenticate with an API key passed as the `key` query parameter.
//! Each client owns a `reqwest::Client` built with its own timeout; a
//! timeout surfaces as an ordinary provider error.

use crate::config::GoogleCloudConfig;
use crate::error::VoiceError;
use crate::stt::{RecognitionRequest, RecognitionResponse, SpeechRecognizer};
use crate::tts::{AudioSettings, SpeechSynthesizer, SynthesisRequest};
use crate::{build_http_client, preview};
use async_trait::async_trait;
use kisan_types::VoiceProfile;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on provider diagnostic text carried in an error.
const MAX_DIAGNOSTIC_CHARS: usize = 1_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeConfig<'a> {
    encoding: &'static str,
    audio_channel_count: u32,
    language_code: &'a str,
    enable_automatic_punctuation: bool,
    model: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    use_enhanced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_word_time_offsets: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    enable_word_confidence: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_alternatives: Option<u32>,
}

#[derive(Serialize)]
struct AudioContent<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct RecognizeBody<'a> {
    config: RecognizeConfig<'a>,
    audio: AudioContent<'a>,
}

impl<'a> From<&RecognitionRequest<'a>> for RecognizeBody<'a> {
    fn from(request: &RecognitionRequest<'a>) -> Self {
        let model = request.model;
        Self {
            config: RecognizeConfig {
                encoding: "WEBM_OPUS",
                audio_channel_count: 1,
                language_code: request.language,
                enable_automatic_punctuation: true,
                model: &model.model,
                use_enhanced: model.use_enhanced,
                enable_word_time_offsets: model.use_enhanced.then_some(false),
                enable_word_confidence: model.enable_word_confidence,
                max_alternatives: model.max_alternatives,
            },
            audio: AudioContent {
                content: request.audio_base64,
            },
        }
    }
}

/// Google Cloud `speech:recognize` client.
#[derive(Debug, Clone)]
pub struct GoogleRecognizer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GoogleRecognizer {
    pub fn new(config: &GoogleCloudConfig) -> Result<Self, VoiceError> {
        let timeout = Duration::from_secs(config.stt_timeout_secs);
        Ok(Self {
            http: build_http_client(timeout).map_err(VoiceError::Stt)?,
            endpoint: config.stt_endpoint.clone(),
            api_key: config.stt_key().map(str::to_string),
            timeout,
        })
    }

    fn key(&self) -> Result<&str, VoiceError> {
        self.api_key
            .as_deref()
            .ok_or(VoiceError::MissingCredential("GOOGLE_STT_API_KEY"))
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleRecognizer {
    fn ensure_configured(&self) -> Result<(), VoiceError> {
        self.key().map(|_| ())
    }

    async fn recognize(
        &self,
        request: &RecognitionRequest<'_>,
    ) -> Result<RecognitionResponse, VoiceError> {
        let key = self.key()?;
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&RecognizeBody::from(request))
            .send()
            .await
            .map_err(|e| VoiceError::Stt(transport_failure(&e, self.timeout)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!(
                "provider returned {}: {}",
                status,
                preview(&body, MAX_DIAGNOSTIC_CHARS)
            )));
        }

        response
            .json::<RecognitionResponse>()
            .await
            .map_err(|e| VoiceError::Stt(format!("invalid response body: {}", e)))
    }
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceProfile,
    audio_config: AudioSettings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeReply {
    audio_content: String,
}

/// Google Cloud `text:synthesize` client.
#[derive(Debug, Clone)]
pub struct GoogleSynthesizer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GoogleSynthesizer {
    pub fn new(config: &GoogleCloudConfig) -> Result<Self, VoiceError> {
        let timeout = Duration::from_secs(config.tts_timeout_secs);
        Ok(Self {
            http: build_http_client(timeout).map_err(VoiceError::Tts)?,
            endpoint: config.tts_endpoint.clone(),
            api_key: config.tts_key().map(str::to_string),
            timeout,
        })
    }

    fn key(&self) -> Result<&str, VoiceError> {
        self.api_key
            .as_deref()
            .ok_or(VoiceError::MissingCredential("GOOGLE_TTS_API_KEY"))
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSynthesizer {
    fn ensure_configured(&self) -> Result<(), VoiceError> {
        self.key().map(|_| ())
    }

    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String, VoiceError> {
        let key = self.key()?;
        let body = SynthesizeBody {
            input: SynthesisInput { text: request.text },
            voice: request.voice,
            audio_config: request.audio,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(transport_failure(&e, self.timeout)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "provider returned {}: {}",
                status,
                preview(&body, MAX_DIAGNOSTIC_CHARS)
            )));
        }

        let reply: SynthesizeReply = response
            .json()
            .await
            .map_err(|e| VoiceError::Tts(format!("invalid response body: {}", e)))?;
        Ok(reply.audio_content)
    }
}

fn transport_failure(error: &reqwest::Error, timeout: Duration) -> String {
    if error.is_timeout() {
        format!("request timed out after {} seconds", timeout.as_secs())
    } else {
        format!("request failed: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::RecognitionModel;

    #[test]
    fn enhanced_request_carries_enhanced_fields() {
        let model = RecognitionModel::enhanced_long();
        let request = RecognitionRequest {
            audio_base64: "AAAA",
            language: "hi-IN",
            model: &model,
        };
        let body = serde_json::to_value(RecognizeBody::from(&request)).unwrap();
        let config = &body["config"];
        assert_eq!(config["encoding"], "WEBM_OPUS");
        assert_eq!(config["audioChannelCount"], 1);
        assert_eq!(config["languageCode"], "hi-IN");
        assert_eq!(config["model"], "latest_long");
        assert_eq!(config["useEnhanced"], true);
        assert_eq!(config["enableWordTimeOffsets"], false);
        assert_eq!(config["enableWordConfidence"], true);
        assert_eq!(config["maxAlternatives"], 1);
        assert_eq!(body["audio"]["content"], "AAAA");
    }

    #[test]
    fn baseline_request_omits_enhanced_fields() {
        let model = RecognitionModel::baseline();
        let request = RecognitionRequest {
            audio_base64: "AAAA",
            language: "ta-IN",
            model: &model,
        };
        let body = serde_json::to_value(RecognizeBody::from(&request)).unwrap();
        let config = body["config"].as_object().unwrap();
        assert_eq!(config["model"], "default");
        assert_eq!(config["enableAutomaticPunctuation"], true);
        assert!(!config.contains_key("useEnhanced"));
        assert!(!config.contains_key("enableWordConfidence"));
        assert!(!config.contains_key("maxAlternatives"));
    }

    #[test]
    fn missing_keys_are_configuration_errors() {
        let config = GoogleCloudConfig::default();
        let recognizer = GoogleRecognizer::new(&config).unwrap();
        assert!(matches!(
            recognizer.ensure_configured(),
            Err(VoiceError::MissingCredential("GOOGLE_STT_API_KEY"))
        ));
        let synthesizer = GoogleSynthesizer::new(&config).unwrap();
        assert!(matches!(
            synthesizer.ensure_configured(),
            Err(VoiceError::MissingCredential("GOOGLE_TTS_API_KEY"))
        ));
    }
}
