//! OpenAI-compatible chat completions provider (Groq, OpenAI).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LlmConfig;
use super::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use crate::error::LlmError;

/// `LlmProvider` over the `/chat/completions` endpoint.
pub struct OpenAiCompatProvider {
    client: Client,
    provider: &'static str,
    api_key: SecretString,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiCompatProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider = config.backend.name();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: provider.to_string(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            provider,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_wire(&self, request: &CompletionRequest) -> WireRequest {
        WireRequest {
            model: self.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn request_failed(&self, reason: impl Into<String>) -> LlmError {
        LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_wire(&request);
        debug!(
            provider = self.provider,
            model = %self.model,
            messages = body.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        provider: self.provider.to_string(),
                        timeout: self.timeout,
                    }
                } else if e.is_connect() {
                    self.request_failed(format!("Connection failed: {e}"))
                } else {
                    self.request_failed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed {
                provider: self.provider.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(LlmError::RateLimited {
                provider: self.provider.to_string(),
                retry_after,
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(300).collect();
            return Err(self.request_failed(format!("HTTP {status}: {detail}")));
        }

        let wire: WireResponse = response.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: self.provider.to_string(),
            reason: format!("Malformed completion body: {e}"),
        })?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: self.provider.to_string(),
                reason: "No choices in response".to_string(),
            })?;

        let usage = wire.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default().trim().to_string(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
            response_id: wire.id,
        })
    }
}

// ── Wire format ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: super::provider::Role,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: Option<String>,
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
