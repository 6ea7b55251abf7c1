//! Answer generation.
//!
//! [`AnswerGenerator`] is the seam the chat pipeline calls. The shipped
//! implementation talks to any OpenAI-compatible `chat/completions`
//! endpoint (hosted or a local model server).

use crate::config::LlmConfig;
use crate::error::VoiceError;
use crate::{build_http_client, preview};
use async_trait::async_trait;
use kisan_types::language_name;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Produces an answer to a farmer's question.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn answer(&self, question: &str, language: &str) -> Result<String, VoiceError>;
}

/// Builds the system prompt for `language`.
///
/// Known tags are named ("Hindi"); unknown tags are passed through as-is so
/// the model can still attempt them.
pub fn system_prompt(language: &str) -> String {
    let name = language_name(language).unwrap_or(language);
    format!(
        "You are Kisan Vani, a friendly agricultural assistant for farmers in India. \
         Give practical, accurate advice on crops, sowing and harvest timing, irrigation, \
         soil health, fertilizers, pest and disease control, weather and government schemes. \
         Keep answers short and simple enough to be read aloud. \
         Always reply in {name} ({language})."
    )
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig) -> Result<Self, VoiceError> {
        let http = build_http_client(Duration::from_secs(config.timeout_secs))
            .map_err(VoiceError::Llm)?;
        Ok(Self { http, config })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl AnswerGenerator for ChatCompletionsClient {
    async fn answer(&self, question: &str, language: &str) -> Result<String, VoiceError> {
        let prompt = system_prompt(language);
        let body = CompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        let mut request = self.http.post(self.url()).json(&body);
        if let Some(key) = self.config.key() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VoiceError::Llm(format!(
                    "request timed out after {} seconds",
                    self.config.timeout_secs
                ))
            } else {
                VoiceError::Llm(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VoiceError::Llm(format!(
                "provider returned {}: {}",
                status,
                preview(&text, 1_000)
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Llm(format!("invalid response body: {}", e)))?;

        let answer = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| VoiceError::Llm("provider returned an empty answer".to_string()))?;

        tracing::info!(
            model = %self.config.model,
            language,
            answer = %preview(&answer, 80),
            "answer generated"
        );
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_known_language() {
        let prompt = system_prompt("hi-IN");
        assert!(prompt.contains("Always reply in Hindi (hi-IN)."));
    }

    #[test]
    fn prompt_passes_unknown_tag_through() {
        let prompt = system_prompt("sw-KE");
        assert!(prompt.contains("Always reply in sw-KE (sw-KE)."));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = ChatCompletionsClient::new(LlmConfig {
            endpoint: "http://localhost:11434/v1/".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();
        assert_eq!(client.url(), "http://localhost:11434/v1/chat/completions");
    }
}
