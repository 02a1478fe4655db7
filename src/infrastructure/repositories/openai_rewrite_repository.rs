use super::rewrite_model::{ModelCompletion, ModelError, RewriteModel};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, FinishReason},
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::{Duration, Instant};

const TEMPERATURE: f32 = 0.3;

/// OpenAI chat completions implementation of the rewrite model
pub struct OpenAiRewriteRepository {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiRewriteRepository {
    /// `base_url` is the API root without the `/v1` suffix.
    pub fn new(api_key: Option<String>, base_url: &str, model: String) -> Self {
        let client = api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                let config = OpenAIConfig::new()
                    .with_api_key(key)
                    .with_api_base(format!("{}/v1", base_url.trim_end_matches('/')));
                // Retries belong to the cleaning service's RetryPolicy; the
                // client must give up after its first attempt.
                let no_retry = ExponentialBackoffBuilder::new()
                    .with_max_elapsed_time(Some(Duration::ZERO))
                    .build();
                Client::with_config(config).with_backoff(no_retry)
            });

        Self { client, model }
    }
}

fn classify(err: OpenAIError) -> ModelError {
    match err {
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.clone().unwrap_or_default();
            let code = api
                .code
                .as_ref()
                .map(|code| code.to_string())
                .unwrap_or_default();
            if code.contains("rate_limit") || kind.contains("rate_limit") || kind == "requests" {
                ModelError::RateLimited(api.message)
            } else if kind == "server_error" {
                ModelError::Transient(api.message)
            } else {
                ModelError::Api {
                    status: 400,
                    message: api.message,
                }
            }
        }
        OpenAIError::Reqwest(e) => ModelError::Transient(e.to_string()),
        OpenAIError::JSONDeserialize(e) => ModelError::Transient(format!("invalid response body: {e}")),
        other => ModelError::Api {
            status: 0,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl RewriteModel for OpenAiRewriteRepository {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn ensure_credentials(&self) -> Result<(), ModelError> {
        match self.client {
            Some(_) => Ok(()),
            None => Err(ModelError::AuthenticationMissing {
                env_var: "OPENAI_API_KEY",
            }),
        }
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<ModelCompletion, ModelError> {
        let client = self.client.as_ref().ok_or(ModelError::AuthenticationMissing {
            env_var: "OPENAI_API_KEY",
        })?;

        tracing::info!(
            model = %self.model,
            prompt_length = prompt.chars().count(),
            max_tokens = max_tokens,
            "Calling OpenAI chat completions API"
        );

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(classify)?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(max_tokens)
            .temperature(TEMPERATURE)
            .messages([message.into()])
            .build()
            .map_err(classify)?;

        let started = Instant::now();
        let response = client.chat().create(request).await.map_err(|e| {
            tracing::warn!(error = %e, model = %self.model, "OpenAI chat completion failed");
            classify(e)
        })?;

        let (text, truncated) = response
            .choices
            .into_iter()
            .next()
            .map(|choice| {
                (
                    choice.message.content.unwrap_or_default(),
                    matches!(choice.finish_reason, Some(FinishReason::Length)),
                )
            })
            .unwrap_or_default();

        let (input_tokens, output_tokens) = response
            .usage
            .map(|usage| (u64::from(usage.prompt_tokens), u64::from(usage.completion_tokens)))
            .unwrap_or((0, 0));

        tracing::debug!(
            model = %self.model,
            input_tokens = input_tokens,
            output_tokens = output_tokens,
            truncated = truncated,
            latency_ms = started.elapsed().as_millis() as u64,
            "OpenAI completion received"
        );

        Ok(ModelCompletion {
            text,
            input_tokens,
            output_tokens,
            truncated,
        })
    }
}
