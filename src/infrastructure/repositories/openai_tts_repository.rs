use super::tts_repository::{text_preview, SpeechProviderError, TtsRepository};
use crate::domain::tts::TtsProvider;
use async_trait::async_trait;
use serde::Serialize;

pub const OPENAI_API_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// OpenAI TTS implementation of TTS repository
///
/// Talks to `/v1/audio/speech` directly so that any voice name the API accepts
/// (including `cedar` and `marin`) can be used.
pub struct OpenAiTtsRepository {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: reqwest::Client, api_key: Option<String>, base_url: String) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    fn provider(&self) -> TtsProvider {
        TtsProvider::OpenAi
    }

    fn ensure_credentials(&self) -> Result<(), SpeechProviderError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(SpeechProviderError::AuthenticationMissing {
                env_var: TtsProvider::OpenAi.profile().credential_env,
            }),
        }
    }

    async fn convert(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> Result<Vec<u8>, SpeechProviderError> {
        self.ensure_credentials()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();

        tracing::info!(
            model = %model_id,
            voice = %voice_id,
            text_length = text.chars().count(),
            text_preview = %text_preview(text),
            "Calling OpenAI TTS API"
        );

        let request = SpeechRequest {
            model: model_id,
            voice: voice_id,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, voice = %voice_id, "OpenAI TTS request failed");
                SpeechProviderError::Transport {
                    provider: TtsProvider::OpenAi,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                error = %message,
                model = %model_id,
                voice = %voice_id,
                text_length = text.chars().count(),
                "OpenAI TTS API call failed"
            );
            return Err(SpeechProviderError::Provider {
                provider: TtsProvider::OpenAi,
                status: status.as_u16(),
                message,
            });
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechProviderError::Transport {
                provider: TtsProvider::OpenAi,
                message: format!("failed to read audio stream: {e}"),
            })?
            .to_vec();

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "OpenAI TTS audio received successfully"
        );

        Ok(audio_bytes)
    }
}
