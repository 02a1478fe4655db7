use async_trait::async_trait;

/// Text and token usage returned by a completion call.
///
/// `text` may be empty; deciding what an empty answer means is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCompletion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Generation stopped at the `max_tokens` limit
    pub truncated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{env_var} not set in environment")]
    AuthenticationMissing { env_var: &'static str },

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("transient API error: {0}")]
    Transient(String),

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

impl ModelError {
    /// Whether a later attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::RateLimited(_) | ModelError::Transient(_))
    }

    /// Classify a non-success HTTP status from a completion API
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => ModelError::RateLimited(message),
            408 | 500..=599 => ModelError::Transient(message),
            _ => ModelError::Api { status, message },
        }
    }
}

/// Language model that rewrites text on instruction.
#[async_trait]
pub trait RewriteModel: Send + Sync {
    /// Identifier stored alongside cached results
    fn model_id(&self) -> &str;

    fn ensure_credentials(&self) -> Result<(), ModelError>;

    /// Send a single-turn prompt and return the model's text.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<ModelCompletion, ModelError>;
}
