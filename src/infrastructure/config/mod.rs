use crate::domain::cleaning::PromptStyle;
use crate::domain::tts::TtsProvider;
use crate::infrastructure::repositories::{ANTHROPIC_API_URL, ELEVENLABS_API_URL, OPENAI_API_URL};
use serde::Deserialize;
use std::env;

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OPENAI_CLEANER_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub output_dir: String,
    // Speech
    pub tts_provider: TtsProvider,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice: Option<String>,
    pub elevenlabs_model: Option<String>,
    pub elevenlabs_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_voice: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: String,
    pub intro_voice: Option<String>,
    pub pause_seconds: f64,
    // Audio tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    // Cleaning
    pub cleaner_backend: CleanerBackend,
    pub cleaner_model: String,
    pub cleaner_prompt_style: PromptStyle,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub cleaner_cache_enabled: bool,
    pub cleaner_cache_dir: String,
    pub cleaner_max_retries: u32,
    pub cleaner_retry_base_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Language model used for text cleaning
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CleanerBackend {
    Anthropic,
    OpenAi,
}

impl CleanerBackend {
    pub fn default_model(&self) -> &'static str {
        match self {
            CleanerBackend::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            CleanerBackend::OpenAi => DEFAULT_OPENAI_CLEANER_MODEL,
        }
    }
}

impl std::str::FromStr for CleanerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(CleanerBackend::Anthropic),
            "openai" | "open_ai" => Ok(CleanerBackend::OpenAi),
            other => Err(format!("unknown cleaner backend: {other}")),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let cleaner_backend: CleanerBackend = env::var("CLEANER_BACKEND")
            .unwrap_or_else(|_| "anthropic".to_string())
            .parse()?;

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "episodes".to_string()),
            tts_provider: env::var("TTS_PROVIDER")
                .unwrap_or_else(|_| "elevenlabs".to_string())
                .parse()?,
            elevenlabs_api_key: optional("ELEVENLABS_API_KEY"),
            elevenlabs_voice: optional("VOICE_ID"),
            elevenlabs_model: optional("MODEL_ID"),
            elevenlabs_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| ELEVENLABS_API_URL.to_string()),
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_voice: optional("OPENAI_VOICE"),
            openai_model: optional("OPENAI_MODEL"),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| OPENAI_API_URL.to_string()),
            intro_voice: optional("INTRO_VOICE"),
            pause_seconds: env::var("PAUSE_SECONDS")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()?,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            cleaner_backend,
            cleaner_model: optional("CLEANER_MODEL")
                .unwrap_or_else(|| cleaner_backend.default_model().to_string()),
            cleaner_prompt_style: env::var("CLEANER_PROMPT_STYLE")
                .unwrap_or_else(|_| "json".to_string())
                .parse()?,
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            anthropic_base_url: env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| ANTHROPIC_API_URL.to_string()),
            cleaner_cache_enabled: env::var("CLEANER_CACHE_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
            cleaner_cache_dir: env::var("CLEANER_CACHE_DIR")
                .unwrap_or_else(|_| ".cache/blog_cleaner".to_string()),
            cleaner_max_retries: env::var("CLEANER_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            cleaner_retry_base_ms: env::var("CLEANER_RETRY_BASE_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
        };

        if !config.pause_seconds.is_finite() || config.pause_seconds < 0.0 {
            return Err(format!("PAUSE_SECONDS must be >= 0, got {}", config.pause_seconds).into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Unset and blank variables both read as `None`
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
