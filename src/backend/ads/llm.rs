//! Chat-completions client
//!
//! Calls `{OPENAI_BASE_URL}/chat/completions` with a system and a user
//! message. A 429 is retried once after `Retry-After` seconds, capped by
//! `OPENAI_RATE_LIMIT_WAIT_SECS`.

use std::time::Duration;

use reqwest::{header::RETRY_AFTER, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::OpenAiSettings;

/// Sampling temperature for caption generation
pub const TEMPERATURE: f32 = 0.7;

/// Wait used when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
    #[error("rate limited by the model provider")]
    RateLimited,
    #[error("model provider returned HTTP {status}")]
    Http { status: u16, body: String },
    #[error("model provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned no content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LlmClient {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl LlmClient {
    pub fn new(client: reqwest::Client, settings: OpenAiSettings) -> Self {
        if settings.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, caption generation will fail");
        }
        Self { client, settings }
    }

    fn retry_wait(&self, response: &reqwest::Response) -> Duration {
        let requested = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS as f64);
        let capped = requested.min(self.settings.rate_limit_wait_secs as f64);
        Duration::from_secs_f64(capped)
    }

    /// Run one chat completion and return the trimmed assistant text
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.settings.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: TEMPERATURE,
        };

        let mut retried = false;
        let response = loop {
            tracing::debug!("[OpenAI] Sending request: model={}", self.settings.model);
            let response = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                break response;
            }
            if retried {
                tracing::warn!("[OpenAI] Rate limited twice, giving up");
                return Err(LlmError::RateLimited);
            }
            let wait = self.retry_wait(&response);
            tracing::warn!("[OpenAI] Rate limited, retrying in {:?}", wait);
            tokio::time::sleep(wait).await;
            retried = true;
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("[OpenAI] HTTP {}: {}", status, body);
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}
