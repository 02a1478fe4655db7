pub mod cleaning;
pub mod episode;
pub mod tts;
