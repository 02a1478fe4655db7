use crate::error::AppError;
use crate::infrastructure::repositories::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum CleaningError {
    #[error("{0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("cleaning failed after {attempts} attempt(s): {source}")]
    Provider { attempts: u32, source: ModelError },
}

impl CleaningError {
    pub fn from_model(attempts: u32, err: ModelError) -> Self {
        match err {
            ModelError::AuthenticationMissing { .. } => CleaningError::Configuration(err.to_string()),
            other => CleaningError::Provider {
                attempts,
                source: other,
            },
        }
    }
}

impl From<CleaningError> for AppError {
    fn from(err: CleaningError) -> Self {
        match err {
            CleaningError::Configuration(msg) => AppError::Configuration(msg),
            CleaningError::Invalid(msg) => AppError::BadRequest(msg),
            CleaningError::Provider { .. } => AppError::ExternalService(err.to_string()),
        }
    }
}
