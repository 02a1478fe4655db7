pub mod dto;
pub mod error;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod service;
pub mod stats;

pub use error::CleaningError;
pub use model::{CleanResult, TextChange};
pub use prompt::PromptStyle;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use service::{CleaningService, CleaningServiceApi};
pub use stats::UsageSnapshot;
