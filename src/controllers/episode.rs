use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::episode::{EpisodeRequest, EpisodeServiceApi, EpisodeSummary},
    error::AppResult,
};

pub struct EpisodeController {
    episode_service: Arc<dyn EpisodeServiceApi>,
}

impl EpisodeController {
    pub fn new(episode_service: Arc<dyn EpisodeServiceApi>) -> Self {
        Self { episode_service }
    }

    /// POST /api/episodes - Clean, introduce and render an article
    pub async fn create_episode(
        State(controller): State<Arc<EpisodeController>>,
        Json(request): Json<EpisodeRequest>,
    ) -> AppResult<(StatusCode, Json<EpisodeSummary>)> {
        let summary = controller.episode_service.create_episode(request).await?;
        Ok((StatusCode::CREATED, Json(summary)))
    }
}
