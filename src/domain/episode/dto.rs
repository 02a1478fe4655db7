use crate::domain::tts::TtsProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request for POST /api/episodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Article HTML, used when `text` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
    #[serde(default)]
    pub skip_clean: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<TtsProvider>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub title: String,
    pub slug: String,
    pub output_path: PathBuf,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
    pub provider: TtsProvider,
    pub voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_voice: Option<String>,
    pub was_edited: bool,
    pub changes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning_diagnostic: Option<String>,
    pub chunk_count: usize,
    pub segment_count: usize,
    pub characters: usize,
    pub published_at: DateTime<Utc>,
}
