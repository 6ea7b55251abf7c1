//! Voice profile definitions.
//!
//! A `VoiceProfile` maps a language tag to a concrete synthesis voice. The
//! table is static: unsupported tags resolve to the `en-US` profile rather
//! than failing.

use serde::Serialize;

/// Language tag whose profile is used for unsupported tags.
pub const DEFAULT_VOICE_LANGUAGE: &str = "en-US";

/// A synthesis voice for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceProfile {
    /// BCP-47 language code sent to the provider.
    #[serde(rename = "languageCode")]
    pub language_code: &'static str,
    /// Provider voice name.
    pub name: &'static str,
}

struct VoiceEntry {
    tag: &'static str,
    language_name: &'static str,
    voice: &'static str,
}

const VOICES: &[VoiceEntry] = &[
    VoiceEntry {
        tag: "hi-IN",
        language_name: "Hindi",
        voice: "hi-IN-Wavenet-D",
    },
    VoiceEntry {
        tag: "en-US",
        language_name: "English",
        voice: "en-US-Wavenet-D",
    },
    VoiceEntry {
        tag: "en-IN",
        language_name: "English",
        voice: "en-IN-Wavenet-D",
    },
    VoiceEntry {
        tag: "mr-IN",
        language_name: "Marathi",
        voice: "mr-IN-Wavenet-A",
    },
    VoiceEntry {
        tag: "gu-IN",
        language_name: "Gujarati",
        voice: "gu-IN-Wavenet-A",
    },
    VoiceEntry {
        tag: "bn-IN",
        language_name: "Bengali",
        voice: "bn-IN-Wavenet-A",
    },
    VoiceEntry {
        tag: "te-IN",
        language_name: "Telugu",
        voice: "te-IN-Standard-A",
    },
    VoiceEntry {
        tag: "ta-IN",
        language_name: "Tamil",
        voice: "ta-IN-Wavenet-A",
    },
    VoiceEntry {
        tag: "kn-IN",
        language_name: "Kannada",
        voice: "kn-IN-Wavenet-A",
    },
    VoiceEntry {
        tag: "ml-IN",
        language_name: "Malayalam",
        voice: "ml-IN-Wavenet-A",
    },
    VoiceEntry {
        tag: "pa-IN",
        language_name: "Punjabi",
        voice: "pa-IN-Wavenet-A",
    },
];

fn lookup(tag: &str) -> Option<&'static VoiceEntry> {
    VOICES.iter().find(|entry| entry.tag == tag)
}

/// Returns the voice profile for `tag`, falling back to the `en-US` profile.
pub fn voice_profile_for(tag: &str) -> VoiceProfile {
    let entry = lookup(tag)
        .or_else(|| lookup(DEFAULT_VOICE_LANGUAGE))
        .unwrap_or(&VOICES[0]);
    VoiceProfile {
        language_code: entry.tag,
        name: entry.voice,
    }
}

/// Returns the human-readable language name for `tag`, if the tag is known.
pub fn language_name(tag: &str) -> Option<&'static str> {
    lookup(tag).map(|entry| entry.language_name)
}
