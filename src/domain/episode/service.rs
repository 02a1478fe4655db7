use super::dto::{EpisodeRequest, EpisodeSummary};
use super::error::EpisodeError;
use super::html::html_to_text;
use super::intro::{build_intro, join_naturally};
use crate::domain::cleaning::CleaningServiceApi;
use crate::domain::tts::dto::output_path;
use crate::domain::tts::{IntroGenerationRequest, TtsProvider, TtsServiceApi};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MAX_SLUG_LEN: usize = 80;

pub struct EpisodeService {
    tts: Arc<dyn TtsServiceApi>,
    cleaning: Arc<dyn CleaningServiceApi>,
    output_dir: String,
    default_provider: TtsProvider,
}

impl EpisodeService {
    pub fn new(
        tts: Arc<dyn TtsServiceApi>,
        cleaning: Arc<dyn CleaningServiceApi>,
        output_dir: String,
        default_provider: TtsProvider,
    ) -> Self {
        Self {
            tts,
            cleaning,
            output_dir,
            default_provider,
        }
    }
}

#[async_trait]
pub trait EpisodeServiceApi: Send + Sync {
    /// Clean the article (unless skipped), prepend a spoken intro and render
    /// the episode audio.
    async fn create_episode(&self, request: EpisodeRequest) -> Result<EpisodeSummary, EpisodeError>;
}

#[async_trait]
impl EpisodeServiceApi for EpisodeService {
    async fn create_episode(&self, request: EpisodeRequest) -> Result<EpisodeSummary, EpisodeError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(EpisodeError::Invalid("title must not be empty".to_string()));
        }

        // 1. Article body
        let text = match (&request.text, &request.html) {
            (Some(text), _) if !text.trim().is_empty() => text.trim().to_string(),
            (_, Some(html)) if !html.trim().is_empty() => html_to_text(html),
            _ => String::new(),
        };
        if text.is_empty() {
            return Err(EpisodeError::Invalid(
                "episode needs non-empty text or html".to_string(),
            ));
        }

        let slug = slugify(&title);
        let output = output_path(&self.output_dir, &slug, "mp3").map_err(EpisodeError::Invalid)?;
        let provider = request.provider.unwrap_or(self.default_provider);

        tracing::info!(
            title = %title,
            slug = %slug,
            provider = %provider,
            text_length = text.chars().count(),
            skip_clean = request.skip_clean,
            "Episode request"
        );

        // 2. Language cleaning
        let (main_text, was_edited, changes, cleaning_diagnostic) = if request.skip_clean {
            (text, false, Vec::new(), None)
        } else {
            let result = self.cleaning.clean(&text).await?;
            tracing::info!(
                changed = result.changed,
                cached = result.cached,
                change_count = result.changes.len(),
                "Episode text cleaned"
            );
            (
                result.cleaned_text,
                result.changed,
                result.changes,
                result.diagnostic,
            )
        };

        // 3. Intro
        let mut tools = vec![provider.display_name().to_string()];
        if !request.skip_clean {
            tools.push(format!(
                "{} for content preparation",
                cleaner_label(self.cleaning.model_id())
            ));
        }
        let intro = build_intro(request.blog_url.as_deref(), was_edited, &tools);

        // 4. Audio
        let outcome = self
            .tts
            .generate_with_intro(IntroGenerationRequest {
                intro_text: intro,
                main_text,
                output_path: output,
                provider,
                intro_voice: None,
                main_voice: None,
                model: None,
                pause_seconds: None,
            })
            .await?;

        let description = format!(
            "Based on a blog post. {}Generated with {}.",
            if was_edited {
                "Lightly edited for language. "
            } else {
                ""
            },
            join_naturally(&tools)
        );

        tracing::info!(
            slug = %slug,
            output = %outcome.output_path.display(),
            chunk_count = outcome.chunk_count,
            was_edited = was_edited,
            "Episode created"
        );

        Ok(EpisodeSummary {
            title,
            slug,
            output_path: outcome.output_path,
            description,
            blog_url: request.blog_url,
            provider: outcome.provider,
            voice: outcome.voice,
            intro_voice: outcome.intro_voice,
            was_edited,
            changes,
            cleaning_diagnostic,
            chunk_count: outcome.chunk_count,
            segment_count: outcome.segment_count,
            characters: outcome.characters,
            published_at: Utc::now(),
        })
    }
}

/// File-safe name derived from an episode title
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug: String = slug.trim_end_matches('-').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        let id = Uuid::new_v4().simple().to_string();
        format!("episode-{}", &id[..8])
    } else {
        slug
    }
}

fn cleaner_label(model_id: &str) -> String {
    let lower = model_id.to_lowercase();
    if lower.contains("claude") {
        "Claude AI".to_string()
    } else if lower.starts_with("gpt") {
        "OpenAI GPT".to_string()
    } else {
        model_id.to_string()
    }
}
