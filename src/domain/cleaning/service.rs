use super::error::CleaningError;
use super::model::{apply_changes, CleanResult};
use super::parser::{parse_response, ParsedResponse};
use super::prompt::{build_prompt, max_tokens_for, PromptStyle};
use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::stats::{UsageSnapshot, UsageStats};
use crate::infrastructure::repositories::{
    CachedCleaning, CleaningCacheRepository, ModelCompletion, RewriteModel,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

pub struct CleaningService {
    model: Arc<dyn RewriteModel>,
    cache: Option<Arc<CleaningCacheRepository>>,
    style: PromptStyle,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    stats: UsageStats,
}

impl CleaningService {
    pub fn new(
        model: Arc<dyn RewriteModel>,
        cache: Option<Arc<CleaningCacheRepository>>,
        style: PromptStyle,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            model,
            cache,
            style,
            retry,
            sleeper: Arc::new(TokioSleeper),
            stats: UsageStats::default(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

#[async_trait]
pub trait CleaningServiceApi: Send + Sync {
    /// Clean one text, consulting the cache first.
    ///
    /// A model answer that cannot be decoded is not an error: the input comes
    /// back unchanged with `diagnostic` set. Transient model failures are
    /// retried with backoff; the last failure is returned.
    async fn clean(&self, text: &str) -> Result<CleanResult, CleaningError>;

    /// Clean many texts. Cache misses are sent to the model concurrently and
    /// results keep the input order.
    async fn clean_batch(&self, texts: &[String]) -> Result<Vec<CleanResult>, CleaningError>;

    /// Model that produces fresh results
    fn model_id(&self) -> &str;

    fn stats(&self) -> UsageSnapshot;
}

#[async_trait]
impl CleaningServiceApi for CleaningService {
    async fn clean(&self, text: &str) -> Result<CleanResult, CleaningError> {
        validate(text)?;
        self.stats.record_processed();

        tracing::info!(
            text_length = text.chars().count(),
            model = %self.model.model_id(),
            style = %self.style,
            "Text cleaning request"
        );

        if let Some(hit) = self.lookup(text).await {
            return Ok(hit);
        }

        self.clean_uncached(text).await
    }

    async fn clean_batch(&self, texts: &[String]) -> Result<Vec<CleanResult>, CleaningError> {
        for text in texts {
            validate(text)?;
        }

        // 1. Partition into cache hits and misses
        let mut results: Vec<Option<CleanResult>> = vec![None; texts.len()];
        let mut misses = Vec::new();
        for (index, text) in texts.iter().enumerate() {
            self.stats.record_processed();
            match self.lookup(text).await {
                Some(hit) => results[index] = Some(hit),
                None => misses.push(index),
            }
        }

        tracing::info!(
            batch_size = texts.len(),
            cache_hits = texts.len() - misses.len(),
            cache_misses = misses.len(),
            "Batch cleaning request"
        );

        // 2. All misses at once
        let fresh =
            try_join_all(misses.iter().map(|&index| self.clean_uncached(&texts[index]))).await?;

        // 3. Back into input order
        for (index, result) in misses.into_iter().zip(fresh) {
            results[index] = Some(result);
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn model_id(&self) -> &str {
        self.model.model_id()
    }

    fn stats(&self) -> UsageSnapshot {
        self.stats.snapshot(self.model.model_id())
    }
}

impl CleaningService {
    async fn lookup(&self, text: &str) -> Option<CleanResult> {
        let cache = self.cache.as_ref()?;
        let entry = cache.get(text).await?;

        self.stats.record_cache_hit();
        tracing::info!(
            text_length = text.chars().count(),
            cached_model = %entry.model,
            changed = entry.changed,
            "Cleaning cache hit"
        );

        Some(CleanResult {
            cleaned_text: entry.cleaned_text,
            changed: entry.changed,
            changes: entry.changes,
            summary: entry.summary,
            cached: true,
            diagnostic: None,
        })
    }

    async fn clean_uncached(&self, text: &str) -> Result<CleanResult, CleaningError> {
        self.model
            .ensure_credentials()
            .map_err(|e| CleaningError::from_model(0, e))?;

        let prompt = build_prompt(self.style, text);
        let max_tokens = max_tokens_for(self.style, text);
        let completion = self.complete_with_retry(&prompt, max_tokens).await?;
        self.stats
            .record_tokens(completion.input_tokens, completion.output_tokens);

        if completion.text.trim().is_empty() {
            let reason = if completion.truncated {
                truncation_diagnostic(max_tokens)
            } else {
                "model returned no text".to_string()
            };
            return Ok(self.unparseable(text, &reason));
        }

        let result = match parse_response(&completion.text, self.style) {
            ParsedResponse::Rewrite {
                cleaned_text,
                changed,
                changes,
                summary,
            } => {
                if cleaned_text.trim().is_empty() {
                    return Ok(self.unparseable(text, "model returned empty cleaned_text"));
                }
                let changed = changed.unwrap_or(cleaned_text != text);
                CleanResult {
                    cleaned_text,
                    changed,
                    changes,
                    summary,
                    cached: false,
                    diagnostic: None,
                }
            }
            ParsedResponse::ChangeList { changes } => {
                let summary = if changes.is_empty() {
                    "No changes needed".to_string()
                } else {
                    format!("{} replacement(s)", changes.len())
                };
                CleanResult {
                    cleaned_text: apply_changes(text, &changes),
                    changed: !changes.is_empty(),
                    changes: changes.iter().map(ToString::to_string).collect(),
                    summary: Some(summary),
                    cached: false,
                    diagnostic: None,
                }
            }
            ParsedResponse::Unparseable { .. } if completion.truncated => {
                return Ok(self.unparseable(text, &truncation_diagnostic(max_tokens)));
            }
            ParsedResponse::Unparseable { reason } => return Ok(self.unparseable(text, &reason)),
        };

        tracing::info!(
            changed = result.changed,
            change_count = result.changes.len(),
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            "Text cleaned"
        );

        if let Some(cache) = &self.cache {
            let entry = CachedCleaning {
                cleaned_text: result.cleaned_text.clone(),
                changed: result.changed,
                changes: result.changes.clone(),
                summary: result.summary.clone(),
                model: self.model.model_id().to_string(),
            };
            if let Err(e) = cache.put(text, &entry).await {
                tracing::warn!(error = %e, "Failed to write cleaning cache entry");
            }
        }

        Ok(result)
    }

    async fn complete_with_retry(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<ModelCompletion, CleaningError> {
        let mut backoff = self.retry.backoff();

        loop {
            self.stats.record_api_call();
            match self.model.complete(prompt, max_tokens).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_retryable() => match backoff.next_delay() {
                    Some(delay) => {
                        tracing::warn!(
                            error = %e,
                            attempt = backoff.failures(),
                            delay_ms = delay.as_millis() as u64,
                            "Model call failed, retrying"
                        );
                        self.sleeper.sleep(delay).await;
                    }
                    None => {
                        tracing::error!(error = %e, attempts = backoff.failures(), "Model call failed, giving up");
                        return Err(CleaningError::from_model(backoff.failures(), e));
                    }
                },
                Err(e) => {
                    tracing::error!(error = %e, "Model call failed");
                    return Err(CleaningError::from_model(backoff.failures() + 1, e));
                }
            }
        }
    }

    fn unparseable(&self, text: &str, reason: &str) -> CleanResult {
        self.stats.record_parse_failure();
        tracing::warn!(
            reason = %reason,
            text_length = text.chars().count(),
            "Model answer unusable, returning text unchanged"
        );
        CleanResult::unchanged(text, reason)
    }
}

fn truncation_diagnostic(max_tokens: u32) -> String {
    format!("model answer truncated at max_tokens ({max_tokens}); text too long to rewrite in one call")
}

fn validate(text: &str) -> Result<(), CleaningError> {
    if text.trim().is_empty() {
        return Err(CleaningError::Invalid("text must not be empty".to_string()));
    }
    Ok(())
}
