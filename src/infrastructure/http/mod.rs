use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{
    cleaning::CleaningController, episode::EpisodeController, health, tts::TtsController,
};
use crate::infrastructure::audio::FfmpegAssembler;
use crate::infrastructure::config::Config;

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router with all routes configured
pub fn create_router(
    assembler: Arc<FfmpegAssembler>,
    tts_controller: Arc<TtsController>,
    cleaning_controller: Arc<CleaningController>,
    episode_controller: Arc<EpisodeController>,
) -> Router {
    let tts_routes = Router::new()
        .route("/api/tts/generate", post(TtsController::generate))
        .route(
            "/api/tts/generate-with-intro",
            post(TtsController::generate_with_intro),
        )
        .with_state(tts_controller);

    let cleaning_routes = Router::new()
        .route("/api/clean", post(CleaningController::clean))
        .route("/api/clean/batch", post(CleaningController::clean_batch))
        .route("/api/clean/stats", get(CleaningController::stats))
        .with_state(cleaning_controller);

    let episode_routes = Router::new()
        .route("/api/episodes", post(EpisodeController::create_episode))
        .with_state(episode_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(assembler)
        .merge(tts_routes)
        .merge(cleaning_routes)
        .merge(episode_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve the router until the process stops
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
