pub mod cleaning;
pub mod episode;
pub mod health;
pub mod tts;
