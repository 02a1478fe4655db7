use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::audio::FfmpegAssembler;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(assembler): State<Arc<FfmpegAssembler>>) -> impl IntoResponse {
    match assembler.check_available().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "ffmpeg": "available"
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Audio tools unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "ffmpeg": "unavailable",
                    "message": e.to_string()
                })),
            )
        }
    }
}
