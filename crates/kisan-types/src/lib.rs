//! Shared types and defaults for the Kisan voice backend.
//!
//! This crate holds the data model that crosses crate boundaries: the
//! persisted interaction record, the content a caller supplies to create
//! one, the request defaults the HTTP surface applies, and the voice
//! profile table used for speech synthesis.
//!
//! Nothing here performs I/O. Storage lives in `kisan-db`, remote providers
//! in `kisan-voice`.

pub mod voice;

use serde::{Deserialize, Serialize};

pub use voice::{language_name, voice_profile_for, VoiceProfile, DEFAULT_VOICE_LANGUAGE};

/// Language tag applied when a request does not name one.
pub const DEFAULT_LANGUAGE: &str = "hi-IN";

/// Farmer identifier applied when a chat request does not name one.
pub const DEFAULT_FARMER_ID: &str = "farmer_123";

/// Display name applied when a chat request does not name one.
pub const DEFAULT_FARMER_NAME: &str = "Anonymous Farmer";

/// Returns [`DEFAULT_LANGUAGE`] as an owned string, for `serde(default)`.
pub fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Returns [`DEFAULT_FARMER_ID`] as an owned string, for `serde(default)`.
pub fn default_farmer_id() -> String {
    DEFAULT_FARMER_ID.to_string()
}

/// Returns [`DEFAULT_FARMER_NAME`] as an owned string, for `serde(default)`.
pub fn default_farmer_name() -> String {
    DEFAULT_FARMER_NAME.to_string()
}

/// One persisted question/answer exchange.
///
/// `id` and `created_at` are assigned by the history store; every other
/// field comes from the caller via [`NewChatRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Store-assigned surrogate identifier.
    pub id: i64,
    /// Opaque farmer identifier.
    pub farmer_id: String,
    /// Optional display name.
    pub farmer_name: Option<String>,
    /// The question as asked.
    pub question: String,
    /// The answer that was synthesized and returned.
    pub answer: String,
    /// Language tag of the exchange (e.g. `hi-IN`).
    pub language: String,
    /// Insert time, ISO 8601 UTC with millisecond precision.
    pub created_at: String,
}

/// The content fields of an interaction, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatRecord {
    pub farmer_id: String,
    #[serde(default = "default_farmer_name_opt")]
    pub farmer_name: Option<String>,
    pub question: String,
    pub answer: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_farmer_name_opt() -> Option<String> {
    Some(default_farmer_name())
}

impl NewChatRecord {
    /// Builds a record for `farmer_id` with the default display name and
    /// language.
    pub fn new(
        farmer_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            farmer_id: farmer_id.into(),
            farmer_name: default_farmer_name_opt(),
            question: question.into(),
            answer: answer.into(),
            language: default_language(),
        }
    }

    /// Sets the display name.
    pub fn with_farmer_name(mut self, name: Option<String>) -> Self {
        self.farmer_name = name;
        self
    }

    /// Sets the language tag.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
