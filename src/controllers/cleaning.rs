use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    domain::cleaning::{
        dto::{CleanBatchRequest, CleanBatchResponse, CleanRequest},
        CleanResult, CleaningServiceApi, UsageSnapshot,
    },
    error::{AppError, AppResult},
};

pub struct CleaningController {
    cleaning_service: Arc<dyn CleaningServiceApi>,
}

impl CleaningController {
    pub fn new(cleaning_service: Arc<dyn CleaningServiceApi>) -> Self {
        Self { cleaning_service }
    }

    /// POST /api/clean
    pub async fn clean(
        State(controller): State<Arc<CleaningController>>,
        Json(request): Json<CleanRequest>,
    ) -> AppResult<Json<CleanResult>> {
        if request.text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }

        let result = controller.cleaning_service.clean(&request.text).await?;
        Ok(Json(result))
    }

    /// POST /api/clean/batch - Results keep the order of `texts`
    pub async fn clean_batch(
        State(controller): State<Arc<CleaningController>>,
        Json(request): Json<CleanBatchRequest>,
    ) -> AppResult<Json<CleanBatchResponse>> {
        if let Some(index) = request.texts.iter().position(|t| t.trim().is_empty()) {
            return Err(AppError::BadRequest(format!(
                "Text at index {index} cannot be empty"
            )));
        }

        let results = controller
            .cleaning_service
            .clean_batch(&request.texts)
            .await?;
        Ok(Json(CleanBatchResponse { results }))
    }

    /// GET /api/clean/stats
    pub async fn stats(State(controller): State<Arc<CleaningController>>) -> Json<UsageSnapshot> {
        Json(controller.cleaning_service.stats())
    }
}
