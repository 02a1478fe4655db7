pub mod chunker;
pub mod dto;
pub mod error;
pub mod provider;
pub mod service;

pub use chunker::chunk_text;
pub use error::TtsServiceError;
pub use provider::{ProviderProfile, TtsProvider, VoiceOverrides};
pub use service::{
    GenerationOutcome, GenerationRequest, IntroGenerationRequest, SpeechProviders, TtsService,
    TtsServiceApi, TtsSettings,
};
