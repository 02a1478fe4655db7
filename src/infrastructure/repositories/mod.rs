pub mod anthropic_rewrite_repository;
pub mod cleaning_cache_repository;
pub mod elevenlabs_tts_repository;
pub mod openai_rewrite_repository;
pub mod openai_tts_repository;
pub mod rewrite_model;
pub mod tts_repository;

pub use anthropic_rewrite_repository::{AnthropicRewriteRepository, ANTHROPIC_API_URL};
pub use cleaning_cache_repository::{cache_key, CachedCleaning, CleaningCacheRepository};
pub use elevenlabs_tts_repository::{ElevenLabsTtsRepository, ELEVENLABS_API_URL};
pub use openai_rewrite_repository::OpenAiRewriteRepository;
pub use openai_tts_repository::{OpenAiTtsRepository, OPENAI_API_URL};
pub use rewrite_model::{ModelCompletion, ModelError, RewriteModel};
pub use tts_repository::{SpeechProviderError, TtsRepository};
