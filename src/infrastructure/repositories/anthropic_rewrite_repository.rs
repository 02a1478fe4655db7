use super::rewrite_model::{ModelCompletion, ModelError, RewriteModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Anthropic Messages API implementation of the rewrite model
pub struct AnthropicRewriteRepository {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl AnthropicRewriteRepository {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        base_url: String,
        model: String,
    ) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait]
impl RewriteModel for AnthropicRewriteRepository {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn ensure_credentials(&self) -> Result<(), ModelError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(ModelError::AuthenticationMissing {
                env_var: "ANTHROPIC_API_KEY",
            }),
        }
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<ModelCompletion, ModelError> {
        self.ensure_credentials()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();

        tracing::info!(
            model = %self.model,
            prompt_length = prompt.chars().count(),
            max_tokens = max_tokens,
            "Calling Anthropic Messages API"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                max_tokens,
                temperature: TEMPERATURE,
                messages: [Message {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(|e| ModelError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                error = %message,
                model = %self.model,
                "Anthropic Messages API call failed"
            );
            return Err(ModelError::from_status(status.as_u16(), message));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Transient(format!("invalid response body: {e}")))?;

        let text = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        let truncated = body.stop_reason.as_deref() == Some("max_tokens");

        let usage = body.usage.unwrap_or(Usage {
            input_tokens: 0,
            output_tokens: 0,
        });

        tracing::debug!(
            model = %self.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            stop_reason = body.stop_reason.as_deref().unwrap_or("unknown"),
            latency_ms = started.elapsed().as_millis() as u64,
            "Anthropic completion received"
        );

        Ok(ModelCompletion {
            text,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            truncated,
        })
    }
}
