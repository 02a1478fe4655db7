use super::chunker::{char_len, chunk_text};
use super::error::TtsServiceError;
use super::provider::{resolve_setting, TtsProvider, VoiceOverrides};
use crate::infrastructure::audio::AudioAssembler;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

/// One speech adapter per provider
#[derive(Clone)]
pub struct SpeechProviders {
    elevenlabs: Arc<dyn TtsRepository>,
    openai: Arc<dyn TtsRepository>,
}

impl SpeechProviders {
    pub fn new(elevenlabs: Arc<dyn TtsRepository>, openai: Arc<dyn TtsRepository>) -> Self {
        Self { elevenlabs, openai }
    }

    pub fn get(&self, provider: TtsProvider) -> &Arc<dyn TtsRepository> {
        match provider {
            TtsProvider::ElevenLabs => &self.elevenlabs,
            TtsProvider::OpenAi => &self.openai,
        }
    }
}

/// Environment level voice settings
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub elevenlabs: VoiceOverrides,
    pub openai: VoiceOverrides,
    pub intro_voice: Option<String>,
    pub pause_seconds: f64,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            elevenlabs: VoiceOverrides::default(),
            openai: VoiceOverrides::default(),
            intro_voice: None,
            pause_seconds: 2.0,
        }
    }
}

impl TtsSettings {
    pub fn overrides(&self, provider: TtsProvider) -> &VoiceOverrides {
        match provider {
            TtsProvider::ElevenLabs => &self.elevenlabs,
            TtsProvider::OpenAi => &self.openai,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text: String,
    pub output_path: PathBuf,
    pub provider: TtsProvider,
    pub voice: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IntroGenerationRequest {
    pub intro_text: String,
    pub main_text: String,
    pub output_path: PathBuf,
    pub provider: TtsProvider,
    pub intro_voice: Option<String>,
    pub main_voice: Option<String>,
    pub model: Option<String>,
    /// Falls back to the configured pause when absent
    pub pause_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub output_path: PathBuf,
    pub provider: TtsProvider,
    pub voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_voice: Option<String>,
    pub model: String,
    /// Chunks the main text was split into
    pub chunk_count: usize,
    /// Audio segments joined into the output file
    pub segment_count: usize,
    pub characters: usize,
}

pub struct TtsService {
    providers: SpeechProviders,
    assembler: Arc<dyn AudioAssembler>,
    settings: TtsSettings,
}

impl TtsService {
    pub fn new(
        providers: SpeechProviders,
        assembler: Arc<dyn AudioAssembler>,
        settings: TtsSettings,
    ) -> Self {
        Self {
            providers,
            assembler,
            settings,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Render `text` into a single audio file at the requested path.
    ///
    /// Text longer than the provider limit is chunked, rendered chunk by chunk
    /// in order and concatenated. Either the output file is written completely
    /// or nothing is left at the output path.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, TtsServiceError>;

    /// Render an intro in its own voice, a pause, then the main text.
    async fn generate_with_intro(
        &self,
        request: IntroGenerationRequest,
    ) -> Result<GenerationOutcome, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, TtsServiceError> {
        if request.text.trim().is_empty() {
            return Err(TtsServiceError::Invalid("text must not be empty".to_string()));
        }

        // 1. Select the adapter and fail fast on missing credentials
        let repo = self.providers.get(request.provider);
        repo.ensure_credentials()
            .map_err(|e| TtsServiceError::from_provider("request", e))?;

        // 2. Resolve voice and model
        let profile = request.provider.profile();
        let overrides = self.settings.overrides(request.provider);
        let voice = resolve_setting(
            request.voice.as_deref(),
            overrides.voice.as_deref(),
            profile.default_voice,
        );
        let model = resolve_setting(
            request.model.as_deref(),
            overrides.model.as_deref(),
            profile.default_model,
        );
        let characters = char_len(&request.text);

        tracing::info!(
            provider = %request.provider,
            voice = %voice,
            model = %model,
            text_length = characters,
            max_chars = profile.max_chars,
            output = %request.output_path.display(),
            "Audio generation request"
        );

        // 3. Render into the output path
        ensure_parent_dir(&request.output_path).await?;
        let workdir = scratch_dir()?;
        let chunk_count = self
            .render_text(
                repo.as_ref(),
                "main",
                &request.text,
                &voice,
                &model,
                workdir.path(),
                &request.output_path,
            )
            .await?;

        tracing::info!(
            provider = %request.provider,
            chunk_count = chunk_count,
            output = %request.output_path.display(),
            "Audio generation completed"
        );

        Ok(GenerationOutcome {
            output_path: request.output_path,
            provider: request.provider,
            voice,
            intro_voice: None,
            model,
            chunk_count,
            segment_count: chunk_count,
            characters,
        })
    }

    async fn generate_with_intro(
        &self,
        request: IntroGenerationRequest,
    ) -> Result<GenerationOutcome, TtsServiceError> {
        if request.intro_text.trim().is_empty() {
            return Err(TtsServiceError::Invalid(
                "intro_text must not be empty".to_string(),
            ));
        }
        if request.main_text.trim().is_empty() {
            return Err(TtsServiceError::Invalid(
                "main_text must not be empty".to_string(),
            ));
        }

        // 1. Select the adapter and fail fast on missing credentials
        let repo = self.providers.get(request.provider);
        repo.ensure_credentials()
            .map_err(|e| TtsServiceError::from_provider("request", e))?;

        let profile = request.provider.profile();
        if char_len(&request.intro_text) > profile.max_chars {
            return Err(TtsServiceError::Invalid(format!(
                "intro_text exceeds the {} character limit of {}",
                profile.max_chars, request.provider
            )));
        }

        // 2. Resolve voices, model and pause
        let overrides = self.settings.overrides(request.provider);
        let intro_voice = resolve_setting(
            request.intro_voice.as_deref(),
            self.settings.intro_voice.as_deref(),
            profile.default_intro_voice,
        );
        let main_voice = resolve_setting(
            request.main_voice.as_deref(),
            overrides.voice.as_deref(),
            profile.default_voice,
        );
        let model = resolve_setting(
            request.model.as_deref(),
            overrides.model.as_deref(),
            profile.default_model,
        );
        let pause_seconds = request
            .pause_seconds
            .unwrap_or(self.settings.pause_seconds);
        let characters = char_len(&request.intro_text) + char_len(&request.main_text);

        tracing::info!(
            provider = %request.provider,
            intro_voice = %intro_voice,
            main_voice = %main_voice,
            model = %model,
            pause_seconds = pause_seconds,
            intro_length = char_len(&request.intro_text),
            main_length = char_len(&request.main_text),
            "Audio generation with intro request"
        );

        ensure_parent_dir(&request.output_path).await?;
        let workdir = scratch_dir()?;
        let extension = profile.file_extension;

        // 3. Intro in a single call
        let intro_path = workdir.path().join(format!("intro.{extension}"));
        let intro_audio = self
            .convert_logged(repo.as_ref(), "intro", &request.intro_text, &intro_voice, &model)
            .await?;
        tokio::fs::write(&intro_path, intro_audio).await?;

        // 4. Main text, chunked when needed
        let main_path = workdir.path().join(format!("main.{extension}"));
        let chunk_count = self
            .render_text(
                repo.as_ref(),
                "main",
                &request.main_text,
                &main_voice,
                &model,
                workdir.path(),
                &main_path,
            )
            .await?;

        // 5. Pause in the intro's stream format
        let mut segments = vec![intro_path.clone()];
        if pause_seconds > 0.0 {
            let intro_format = self.assembler.probe(&intro_path).await?.format;
            let pause_path = workdir.path().join(format!("pause.{extension}"));
            self.assembler
                .synthesize_silence(pause_seconds, &intro_format, &pause_path)
                .await?;
            segments.push(pause_path);
        }
        segments.push(main_path);

        // 6. intro + pause + main into the output path
        self.assembler
            .concatenate(&segments, &request.output_path)
            .await?;

        tracing::info!(
            provider = %request.provider,
            chunk_count = chunk_count,
            segment_count = segments.len(),
            output = %request.output_path.display(),
            "Audio generation with intro completed"
        );

        Ok(GenerationOutcome {
            output_path: request.output_path,
            provider: request.provider,
            voice: main_voice,
            intro_voice: Some(intro_voice),
            model,
            chunk_count,
            segment_count: segments.len(),
            characters,
        })
    }
}

impl TtsService {
    /// Render `text` into `destination`, chunking when it exceeds the provider
    /// limit. Returns the number of chunks.
    #[allow(clippy::too_many_arguments)]
    async fn render_text(
        &self,
        repo: &dyn TtsRepository,
        label: &str,
        text: &str,
        voice: &str,
        model: &str,
        workdir: &Path,
        destination: &Path,
    ) -> Result<usize, TtsServiceError> {
        let profile = repo.provider().profile();

        if char_len(text) <= profile.max_chars {
            let audio = self.convert_logged(repo, label, text, voice, model).await?;
            write_atomically(destination, &audio).await?;
            return Ok(1);
        }

        let chunks = chunk_text(text, profile.max_chars);
        let total = chunks.len();

        tracing::info!(
            provider = %repo.provider(),
            label = %label,
            text_length = char_len(text),
            max_chars = profile.max_chars,
            chunk_count = total,
            "Text exceeds provider limit, generating in chunks"
        );

        let mut segments = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let segment = format!("{label} chunk {}/{}", index + 1, total);
            let audio = self
                .convert_logged(repo, &segment, chunk, voice, model)
                .await?;

            let path = workdir.join(format!(
                "{label}_chunk_{index:03}.{}",
                profile.file_extension
            ));
            tokio::fs::write(&path, audio).await?;
            segments.push(path);
        }

        self.assembler.concatenate(&segments, destination).await?;

        Ok(total)
    }

    async fn convert_logged(
        &self,
        repo: &dyn TtsRepository,
        segment: &str,
        text: &str,
        voice: &str,
        model: &str,
    ) -> Result<Vec<u8>, TtsServiceError> {
        let started = Instant::now();
        let audio = repo
            .convert(text, voice, model)
            .await
            .map_err(|e| TtsServiceError::from_provider(segment, e))?;

        tracing::debug!(
            provider = %repo.provider(),
            segment = %segment,
            text_length = char_len(text),
            audio_size = audio.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Segment audio generated"
        );

        Ok(audio)
    }
}

fn scratch_dir() -> Result<TempDir, TtsServiceError> {
    Ok(tempfile::Builder::new().prefix("articlecast-").tempdir()?)
}

async fn ensure_parent_dir(path: &Path) -> Result<(), TtsServiceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Write through a sibling temporary file so readers never see a partial file.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), TtsServiceError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(parent)?
        .into_temp_path();

    tokio::fs::write(&staged, bytes).await?;
    staged
        .persist(path)
        .map_err(|e| TtsServiceError::Io(e.error))?;
    Ok(())
}
