use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::tts::{
        dto::{output_path, GenerateAudioRequest, GenerateWithIntroRequest},
        GenerationOutcome, GenerationRequest, IntroGenerationRequest, TtsProvider, TtsServiceApi,
    },
    error::{AppError, AppResult},
};

pub struct TtsController {
    tts_service: Arc<dyn TtsServiceApi>,
    output_dir: String,
    default_provider: TtsProvider,
}

impl TtsController {
    pub fn new(
        tts_service: Arc<dyn TtsServiceApi>,
        output_dir: String,
        default_provider: TtsProvider,
    ) -> Self {
        Self {
            tts_service,
            output_dir,
            default_provider,
        }
    }

    /// POST /api/tts/generate - Render text into one audio file
    pub async fn generate(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<GenerateAudioRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        if request.text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }

        let provider = request.provider.unwrap_or(controller.default_provider);
        let output = output_path(
            &controller.output_dir,
            &request.output_name,
            provider.profile().file_extension,
        )
        .map_err(AppError::BadRequest)?;

        let outcome = controller
            .tts_service
            .generate(GenerationRequest {
                text: request.text,
                output_path: output,
                provider,
                voice: request.voice,
                model: request.model,
            })
            .await?;

        audio_response(&outcome).await
    }

    /// POST /api/tts/generate-with-intro - Intro, pause and main text in one file
    pub async fn generate_with_intro(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<GenerateWithIntroRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        if request.intro_text.trim().is_empty() || request.main_text.trim().is_empty() {
            return Err(AppError::BadRequest(
                "intro_text and main_text cannot be empty".to_string(),
            ));
        }
        if let Some(pause) = request.pause_seconds {
            if !pause.is_finite() || pause < 0.0 {
                return Err(AppError::BadRequest(format!(
                    "pause_seconds must be >= 0, got {pause}"
                )));
            }
        }

        let provider = request.provider.unwrap_or(controller.default_provider);
        let output = output_path(
            &controller.output_dir,
            &request.output_name,
            provider.profile().file_extension,
        )
        .map_err(AppError::BadRequest)?;

        let outcome = controller
            .tts_service
            .generate_with_intro(IntroGenerationRequest {
                intro_text: request.intro_text,
                main_text: request.main_text,
                output_path: output,
                provider,
                intro_voice: request.intro_voice,
                main_voice: request.main_voice,
                model: request.model,
                pause_seconds: request.pause_seconds,
            })
            .await?;

        audio_response(&outcome).await
    }
}

async fn audio_response(outcome: &GenerationOutcome) -> AppResult<(StatusCode, HeaderMap, Body)> {
    let audio = tokio::fs::read(&outcome.output_path).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    headers.insert("X-Chunk-Count", HeaderValue::from(outcome.chunk_count));
    headers.insert(
        "X-Provider",
        HeaderValue::from_static(outcome.provider.as_str()),
    );
    headers.insert(
        "X-Voice",
        HeaderValue::from_str(&outcome.voice)
            .map_err(|e| AppError::Internal(format!("invalid voice header: {e}")))?,
    );
    if let Some(file_name) = outcome.output_path.file_name().and_then(|n| n.to_str()) {
        if let Ok(value) = HeaderValue::from_str(file_name) {
            headers.insert("X-Output-File", value);
        }
    }

    Ok((StatusCode::OK, headers, Body::from(audio)))
}
