use serde::{Deserialize, Serialize};
use std::fmt;

fn default_stt_endpoint() -> String {
    "https://speech.googleapis.com/v1/speech:recognize".to_string()
}

fn default_tts_endpoint() -> String {
    "https://texttospeech.googleapis.com/v1/text:synthesize".to_string()
}

fn default_stt_timeout_secs() -> u64 {
    60
}

fn default_tts_timeout_secs() -> u64 {
    30
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:7b-instruct".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.7
}

/// Credentials and endpoints for Google Cloud speech services.
///
/// Keys are optional at load time. A missing key only fails the operation
/// that needs it, when that operation runs.
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleCloudConfig {
    #[serde(default, skip_serializing)]
    pub stt_api_key: Option<String>,
    #[serde(default, skip_serializing)]
    pub tts_api_key: Option<String>,
    #[serde(default = "default_stt_endpoint")]
    pub stt_endpoint: String,
    #[serde(default = "default_tts_endpoint")]
    pub tts_endpoint: String,
    /// Bounded wait for one recognition call. Default: 60.
    #[serde(default = "default_stt_timeout_secs")]
    pub stt_timeout_secs: u64,
    /// Bounded wait for one synthesis call. Default: 30.
    #[serde(default = "default_tts_timeout_secs")]
    pub tts_timeout_secs: u64,
}

impl Default for GoogleCloudConfig {
    fn default() -> Self {
        Self {
            stt_api_key: None,
            tts_api_key: None,
            stt_endpoint: default_stt_endpoint(),
            tts_endpoint: default_tts_endpoint(),
            stt_timeout_secs: default_stt_timeout_secs(),
            tts_timeout_secs: default_tts_timeout_secs(),
        }
    }
}

impl fmt::Debug for GoogleCloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCloudConfig")
            .field("stt_api_key", &redacted(&self.stt_api_key))
            .field("tts_api_key", &redacted(&self.tts_api_key))
            .field("stt_endpoint", &self.stt_endpoint)
            .field("tts_endpoint", &self.tts_endpoint)
            .field("stt_timeout_secs", &self.stt_timeout_secs)
            .field("tts_timeout_secs", &self.tts_timeout_secs)
            .finish()
    }
}

impl GoogleCloudConfig {
    /// The recognition key, if one is set and non-blank.
    pub fn stt_key(&self) -> Option<&str> {
        non_blank(&self.stt_api_key)
    }

    /// The synthesis key, if one is set and non-blank.
    pub fn tts_key(&self) -> Option<&str> {
        non_blank(&self.tts_api_key)
    }
}

/// Settings for an OpenAI-compatible chat completions endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Bearer token. Local model servers usually need none.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &redacted(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmConfig {
    pub fn key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn redacted(value: &Option<String>) -> &'static str {
    if non_blank(value).is_some() {
        "[REDACTED]"
    } else {
        "<unset>"
    }
}
