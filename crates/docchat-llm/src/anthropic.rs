//! Anthropic Messages API provider, non-streaming

use crate::provider::{ModelError, ModelProvider, ModelResult};
use crate::types::{ContentBlock, MessageContent, ModelReply, ModelRequest, ModelTool, Usage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Bound on one model call. A timeout comes back as a network error, which
/// the orchestration loop treats as a recoverable turn failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait::async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn models(&self) -> &[&str] {
        &[
            "claude-sonnet-4-20250514",
            "claude-opus-4-6",
            "claude-haiku-4-5-20251001",
        ]
    }

    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelReply> {
        let body = AnthropicRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: m.role.clone(),
                    content: match &m.content {
                        MessageContent::Text(s) => serde_json::json!(s),
                        MessageContent::Blocks(blocks) => {
                            serde_json::to_value(blocks).unwrap_or_default()
                        }
                    },
                })
                .collect(),
            max_tokens: request.max_tokens.unwrap_or(4096),
            stream: false,
            system: request.system.clone(),
            tools: request.tools.clone(),
        };

        debug!(
            "anthropic request: model={} messages={}",
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(&self.base_url)
            .timeout(REQUEST_TIMEOUT)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("anthropic error {}: {}", status, error_text);

            return Err(match status.as_u16() {
                401 => ModelError::AuthFailed(error_text),
                429 => ModelError::RateLimited {
                    retry_after_ms: 60_000,
                },
                _ => ModelError::RequestFailed(format!("{}: {}", status, error_text)),
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "anthropic usage: in={} out={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(ModelReply::from_blocks(parsed.content))
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ModelTool>>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[allow(dead_code)]
    stop_reason: Option<String>,
    usage: Option<Usage>,
}
