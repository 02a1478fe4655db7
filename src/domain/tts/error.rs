use crate::error::AppError;
use crate::infrastructure::audio::AssemblyError;
use crate::infrastructure::repositories::SpeechProviderError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("{0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("{segment} failed: {source}")]
    Provider {
        segment: String,
        source: SpeechProviderError,
    },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsServiceError {
    /// Attach the failing segment to a provider error. A missing credential is a
    /// configuration problem regardless of which segment hit it.
    pub fn from_provider(segment: impl Into<String>, err: SpeechProviderError) -> Self {
        match err {
            SpeechProviderError::AuthenticationMissing { .. } => {
                TtsServiceError::Configuration(err.to_string())
            }
            other => TtsServiceError::Provider {
                segment: segment.into(),
                source: other,
            },
        }
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Configuration(msg) => AppError::Configuration(msg),
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::Provider { .. } => AppError::ExternalService(err.to_string()),
            TtsServiceError::Assembly(e) => match e {
                AssemblyError::FormatMismatch { .. } => AppError::FormatMismatch(e.to_string()),
                AssemblyError::ToolUnavailable { .. } => AppError::Configuration(e.to_string()),
                _ => AppError::Internal(e.to_string()),
            },
            TtsServiceError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}
