use crate::domain::cleaning::CleaningError;
use crate::domain::tts::TtsServiceError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum EpisodeError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Cleaning(#[from] CleaningError),
    #[error(transparent)]
    Tts(#[from] TtsServiceError),
}

impl From<EpisodeError> for AppError {
    fn from(err: EpisodeError) -> Self {
        match err {
            EpisodeError::Invalid(msg) => AppError::BadRequest(msg),
            EpisodeError::Cleaning(e) => e.into(),
            EpisodeError::Tts(e) => e.into(),
        }
    }
}
