use super::tts_repository::{text_preview, SpeechProviderError, TtsRepository};
use crate::domain::tts::TtsProvider;
use async_trait::async_trait;
use serde_json::json;

pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// Same container and bitrate for every request so segments concatenate by stream copy
const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// ElevenLabs implementation of TTS repository
pub struct ElevenLabsTtsRepository {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ElevenLabsTtsRepository {
    pub fn new(client: reqwest::Client, api_key: Option<String>, base_url: String) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.base_url,
            urlencoding::encode(voice_id)
        )
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    fn provider(&self) -> TtsProvider {
        TtsProvider::ElevenLabs
    }

    fn ensure_credentials(&self) -> Result<(), SpeechProviderError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(SpeechProviderError::AuthenticationMissing {
                env_var: TtsProvider::ElevenLabs.profile().credential_env,
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
            "Calling ElevenLabs TTS API"
        );

        let response = self
            .client
            .post(self.endpoint(voice_id))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", api_key)
            .header("Accept", "audio/mpeg")
            .json(&json!({
                "text": text,
                "model_id": model_id,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, voice = %voice_id, "ElevenLabs TTS request failed");
                SpeechProviderError::Transport {
                    provider: TtsProvider::ElevenLabs,
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
                "ElevenLabs TTS API call failed"
            );
            return Err(SpeechProviderError::Provider {
                provider: TtsProvider::ElevenLabs,
                status: status.as_u16(),
                message,
            });
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechProviderError::Transport {
                provider: TtsProvider::ElevenLabs,
                message: format!("failed to read audio stream: {e}"),
            })?
            .to_vec();

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "ElevenLabs TTS audio received successfully"
        );

        Ok(audio_bytes)
    }
}
