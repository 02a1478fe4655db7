use super::TtsProvider;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request for POST /api/tts/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateAudioRequest {
    pub text: String,
    pub output_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<TtsProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Request for POST /api/tts/generate-with-intro
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateWithIntroRequest {
    pub intro_text: String,
    pub main_text: String,
    pub output_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<TtsProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_seconds: Option<f64>,
}

/// Validate a client supplied file stem and place it under `output_dir`.
pub fn output_path(output_dir: &str, output_name: &str, extension: &str) -> Result<PathBuf, String> {
    let name = output_name.trim();
    if name.is_empty() {
        return Err("output_name must not be empty".to_string());
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") || name.starts_with('.') {
        return Err(format!("invalid output_name: {name}"));
    }

    let stem = name
        .strip_suffix(&format!(".{extension}"))
        .unwrap_or(name);
    Ok(PathBuf::from(output_dir).join(format!("{stem}.{extension}")))
}
