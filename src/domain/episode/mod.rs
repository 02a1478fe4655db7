pub mod dto;
pub mod error;
pub mod html;
pub mod intro;
pub mod service;

pub use dto::{EpisodeRequest, EpisodeSummary};
pub use error::EpisodeError;
pub use service::{EpisodeService, EpisodeServiceApi};
