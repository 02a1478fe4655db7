use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text-to-speech backends the service can render audio with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    ElevenLabs,
    OpenAi,
}

/// Static limits and defaults declared by each provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    pub name: &'static str,
    pub default_voice: &'static str,
    pub default_intro_voice: &'static str,
    pub default_model: &'static str,
    /// Largest text the provider accepts in one request, with a safety margin
    pub max_chars: usize,
    pub credential_env: &'static str,
    pub voice_env: &'static str,
    pub model_env: &'static str,
    /// Extension of the audio container the provider returns
    pub file_extension: &'static str,
}

const ELEVENLABS_PROFILE: ProviderProfile = ProviderProfile {
    name: "elevenlabs",
    default_voice: "JBFqnCBsd6RMkjVDRZzb",
    default_intro_voice: "JBFqnCBsd6RMkjVDRZzb",
    default_model: "eleven_multilingual_v2",
    max_chars: 9000,
    credential_env: "ELEVENLABS_API_KEY",
    voice_env: "VOICE_ID",
    model_env: "MODEL_ID",
    file_extension: "mp3",
};

// The hard limit is 4096; keep a margin.
const OPENAI_PROFILE: ProviderProfile = ProviderProfile {
    name: "openai",
    default_voice: "cedar",
    default_intro_voice: "marin",
    default_model: "gpt-4o-mini-tts",
    max_chars: 4000,
    credential_env: "OPENAI_API_KEY",
    voice_env: "OPENAI_VOICE",
    model_env: "OPENAI_MODEL",
    file_extension: "mp3",
};

impl TtsProvider {
    pub fn profile(&self) -> &'static ProviderProfile {
        match self {
            TtsProvider::ElevenLabs => &ELEVENLABS_PROFILE,
            TtsProvider::OpenAi => &OPENAI_PROFILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.profile().name
    }

    /// Human readable label used in episode intros
    pub fn display_name(&self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => "ElevenLabs text-to-speech",
            TtsProvider::OpenAi => "OpenAI text-to-speech",
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "elevenlabs" | "eleven_labs" | "eleven-labs" => Ok(TtsProvider::ElevenLabs),
            "openai" | "open_ai" => Ok(TtsProvider::OpenAi),
            other => Err(format!("unknown TTS provider: {other}")),
        }
    }
}

/// Voice and model overrides configured through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceOverrides {
    pub voice: Option<String>,
    pub model: Option<String>,
}

/// Pick the first non-blank value: explicit argument, configured override,
/// then the provider default.
pub fn resolve_setting(explicit: Option<&str>, configured: Option<&str>, default: &str) -> String {
    explicit
        .filter(|value| !value.trim().is_empty())
        .or_else(|| configured.filter(|value| !value.trim().is_empty()))
        .unwrap_or(default)
        .trim()
        .to_string()
}
