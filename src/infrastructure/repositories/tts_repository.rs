use crate::domain::tts::TtsProvider;
use async_trait::async_trait;

/// Failures raised by a speech provider adapter
#[derive(Debug, thiserror::Error)]
pub enum SpeechProviderError {
    #[error("{env_var} not set in environment")]
    AuthenticationMissing { env_var: &'static str },

    #[error("{provider} returned HTTP {status}: {message}")]
    Provider {
        provider: TtsProvider,
        status: u16,
        message: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport {
        provider: TtsProvider,
        message: String,
    },
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (ElevenLabs, OpenAI).
///
/// Implementations issue exactly one request per call. Splitting text to fit
/// the provider limit and merging audio is the caller's job, driven by
/// [`TtsProvider::profile`].
#[async_trait]
pub trait TtsRepository: Send + Sync {
    fn provider(&self) -> TtsProvider;

    /// Fails with `AuthenticationMissing` when no credential is configured.
    /// Never touches the network.
    fn ensure_credentials(&self) -> Result<(), SpeechProviderError>;

    /// Convert `text` to encoded audio with the given voice and model.
    ///
    /// # Errors
    /// Returns `AuthenticationMissing` before any request when the credential is
    /// absent, `Provider` for non-success responses and `Transport` when the
    /// request could not be completed. No retries are attempted.
    async fn convert(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> Result<Vec<u8>, SpeechProviderError>;
}

/// First characters of `text`, for logs.
pub(crate) fn text_preview(text: &str) -> String {
    text.chars().take(200).collect()
}
