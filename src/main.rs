use articlecast_backend::controllers::{
    cleaning::CleaningController, episode::EpisodeController, tts::TtsController,
};
use articlecast_backend::domain::cleaning::{CleaningService, CleaningServiceApi, RetryPolicy};
use articlecast_backend::domain::episode::EpisodeService;
use articlecast_backend::domain::tts::{
    SpeechProviders, TtsService, TtsServiceApi, TtsSettings, VoiceOverrides,
};
use articlecast_backend::infrastructure::audio::FfmpegAssembler;
use articlecast_backend::infrastructure::config::{CleanerBackend, Config, LogFormat};
use articlecast_backend::infrastructure::http::{create_router, start_http_server};
use articlecast_backend::infrastructure::repositories::{
    AnthropicRewriteRepository, CleaningCacheRepository, ElevenLabsTtsRepository,
    OpenAiRewriteRepository, OpenAiTtsRepository, RewriteModel,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting ArticleCast Backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        tts_provider = %config.tts_provider,
        has_elevenlabs_key = config.elevenlabs_api_key.is_some(),
        has_openai_key = config.openai_api_key.is_some(),
        has_anthropic_key = config.anthropic_api_key.is_some(),
        cleaner_backend = ?config.cleaner_backend,
        cleaner_model = %config.cleaner_model,
        "Provider credentials environment check"
    );

    let assembler = Arc::new(FfmpegAssembler::new(
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
    ));
    if let Err(e) = assembler.check_available().await {
        tracing::warn!(error = %e, "ffmpeg not available; multi-segment audio will fail");
    }

    let config = Arc::new(config);
    let http_client = reqwest::Client::new();

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let elevenlabs_repo = Arc::new(ElevenLabsTtsRepository::new(
        http_client.clone(),
        config.elevenlabs_api_key.clone(),
        config.elevenlabs_base_url.clone(),
    ));
    let openai_tts_repo = Arc::new(OpenAiTtsRepository::new(
        http_client.clone(),
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));
    let rewrite_model: Arc<dyn RewriteModel> = match config.cleaner_backend {
        CleanerBackend::Anthropic => Arc::new(AnthropicRewriteRepository::new(
            http_client.clone(),
            config.anthropic_api_key.clone(),
            config.anthropic_base_url.clone(),
            config.cleaner_model.clone(),
        )),
        CleanerBackend::OpenAi => Arc::new(OpenAiRewriteRepository::new(
            config.openai_api_key.clone(),
            &config.openai_base_url,
            config.cleaner_model.clone(),
        )),
    };
    let cache_repo = if config.cleaner_cache_enabled {
        tracing::info!(dir = %config.cleaner_cache_dir, "Cleaning cache enabled");
        Some(Arc::new(CleaningCacheRepository::new(
            config.cleaner_cache_dir.clone(),
        )))
    } else {
        None
    };

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let tts_service: Arc<dyn TtsServiceApi> = Arc::new(TtsService::new(
        SpeechProviders::new(elevenlabs_repo, openai_tts_repo),
        assembler.clone(),
        TtsSettings {
            elevenlabs: VoiceOverrides {
                voice: config.elevenlabs_voice.clone(),
                model: config.elevenlabs_model.clone(),
            },
            openai: VoiceOverrides {
                voice: config.openai_voice.clone(),
                model: config.openai_model.clone(),
            },
            intro_voice: config.intro_voice.clone(),
            pause_seconds: config.pause_seconds,
        },
    ));
    let cleaning_service: Arc<dyn CleaningServiceApi> = Arc::new(CleaningService::new(
        rewrite_model,
        cache_repo,
        config.cleaner_prompt_style,
        RetryPolicy {
            max_attempts: config.cleaner_max_retries.max(1),
            base_delay: Duration::from_millis(config.cleaner_retry_base_ms),
        },
    ));
    let episode_service = Arc::new(EpisodeService::new(
        tts_service.clone(),
        cleaning_service.clone(),
        config.output_dir.clone(),
        config.tts_provider,
    ));

    // 3. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let tts_controller = Arc::new(TtsController::new(
        tts_service,
        config.output_dir.clone(),
        config.tts_provider,
    ));
    let cleaning_controller = Arc::new(CleaningController::new(cleaning_service));
    let episode_controller = Arc::new(EpisodeController::new(episode_service));

    // Start HTTP server with all routes
    let app = create_router(
        assembler,
        tts_controller,
        cleaning_controller,
        episode_controller,
    );
    start_http_server(config, app)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "articlecast_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "articlecast_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
