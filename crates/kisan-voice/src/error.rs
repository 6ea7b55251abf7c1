use thiserror::Error;

/// Failures of the voice and answer adapters.
///
/// Variants fall into three categories callers treat differently: input
/// errors (`InvalidAudio`), configuration errors (`MissingCredential`) and
/// provider errors (`Stt`, `Tts`, `Llm`).
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("invalid audio encoding: {0}")]
    InvalidAudio(String),

    #[error("{0} not configured")]
    MissingCredential(&'static str),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl VoiceError {
    /// Returns `true` for failures reported by (or on the way to) a remote
    /// provider.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Stt(_) | Self::Tts(_) | Self::Llm(_))
    }
}
