use articlecast_backend::{
    controllers::{cleaning::CleaningController, episode::EpisodeController, tts::TtsController},
    domain::{
        cleaning::{CleaningService, CleaningServiceApi, PromptStyle, RetryPolicy},
        episode::EpisodeService,
        tts::{SpeechProviders, TtsProvider, TtsService, TtsServiceApi, TtsSettings},
    },
    infrastructure::{
        audio::{AssemblyError, AudioAssembler, AudioFormat, AudioProbe, FfmpegAssembler},
        http::create_router,
        repositories::{
            AnthropicRewriteRepository, CleaningCacheRepository, ElevenLabsTtsRepository,
            OpenAiTtsRepository,
        },
    },
};
use async_trait::async_trait;
use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use wiremock::MockServer;

pub mod api_client;
pub mod assertions;
pub mod mocks;

use api_client::TestClient;

pub const CLEANER_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const SILENCE_MARKER: &[u8] = b"[silence]";

pub struct TestContext {
    pub client: TestClient,
    /// Stands in for ElevenLabs, OpenAI and Anthropic; their paths do not overlap
    pub providers: MockServer,
    pub output_dir: TempDir,
    pub cache: CleaningCacheRepository,
    _cache_dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let providers = MockServer::start().await;
            let output_dir = TempDir::new().expect("Failed to create output dir");
            let cache_dir = TempDir::new().expect("Failed to create cache dir");

            let app = create_app_with_mocked_providers(
                &providers.uri(),
                output_dir.path(),
                cache_dir.path(),
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(50)).await;

            Self {
                client: TestClient::new(&base_url),
                providers,
                cache: CleaningCacheRepository::new(cache_dir.path()),
                output_dir,
                _cache_dir: cache_dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Temp directories are removed on drop
        }
    }
}

impl TestContext {
    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output_dir.path().join(name)
    }

    pub async fn provider_requests(&self, path_prefix: &str) -> usize {
        self.providers
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().starts_with(path_prefix))
            .count()
    }
}

/// ElevenLabs and Anthropic have keys, OpenAI deliberately has none.
fn create_app_with_mocked_providers(base_url: &str, output_dir: &Path, cache_dir: &Path) -> Router {
    let http_client = reqwest::Client::new();

    let elevenlabs = Arc::new(ElevenLabsTtsRepository::new(
        http_client.clone(),
        Some("test-elevenlabs-key".to_string()),
        base_url.to_string(),
    ));
    let openai = Arc::new(OpenAiTtsRepository::new(
        http_client.clone(),
        None,
        base_url.to_string(),
    ));
    let model = Arc::new(AnthropicRewriteRepository::new(
        http_client,
        Some("test-anthropic-key".to_string()),
        base_url.to_string(),
        CLEANER_MODEL.to_string(),
    ));

    let tts_service: Arc<dyn TtsServiceApi> = Arc::new(TtsService::new(
        SpeechProviders::new(elevenlabs, openai),
        Arc::new(ByteAssembler),
        TtsSettings::default(),
    ));
    let cleaning_service: Arc<dyn CleaningServiceApi> = Arc::new(CleaningService::new(
        model,
        Some(Arc::new(CleaningCacheRepository::new(cache_dir))),
        PromptStyle::Json,
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        },
    ));
    let output_dir = output_dir.to_string_lossy().to_string();
    let episode_service = Arc::new(EpisodeService::new(
        tts_service.clone(),
        cleaning_service.clone(),
        output_dir.clone(),
        TtsProvider::ElevenLabs,
    ));

    create_router(
        Arc::new(FfmpegAssembler::default()),
        Arc::new(TtsController::new(
            tts_service,
            output_dir,
            TtsProvider::ElevenLabs,
        )),
        Arc::new(CleaningController::new(cleaning_service)),
        Arc::new(EpisodeController::new(episode_service)),
    )
}

/// Joins segment bytes in order so tests can read back the assembly order.
pub struct ByteAssembler;

#[async_trait]
impl AudioAssembler for ByteAssembler {
    async fn probe(&self, _path: &Path) -> Result<AudioProbe, AssemblyError> {
        Ok(AudioProbe {
            format: AudioFormat {
                codec: "mp3".to_string(),
                sample_rate: 44100,
                channels: 1,
                bit_rate: Some(128_000),
            },
            duration_secs: 1.0,
        })
    }

    async fn synthesize_silence(
        &self,
        _duration_secs: f64,
        _format: &AudioFormat,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        tokio::fs::write(output, SILENCE_MARKER).await?;
        Ok(())
    }

    async fn concatenate(&self, segments: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        if segments.is_empty() {
            return Err(AssemblyError::Empty);
        }
        let mut joined = Vec::new();
        for segment in segments {
            joined.extend(tokio::fs::read(segment).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }
}

pub fn long_article(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| format!("Paragraph {i}. {}", "The quick brown fox jumps over the lazy dog. ".repeat(40)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
