//! HTTP model client for the Anthropic and OpenAI APIs

use std::time::{Duration, Instant};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use shared::{ApiFailure, ProviderId, TokenUsage};
use crate::config::OutreachConfig;
use crate::error::OutreachResult;
use crate::traits::ModelClient;
use crate::types::ModelResponse;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Real model client making one HTTP request per call
pub struct RealModelClient {
    client: reqwest::Client,
    provider: ProviderId,
    model: String,
    api_key: String,
    temperature: f32,
    base_url: String,
}

impl RealModelClient {
    pub fn new(provider: ProviderId, model: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            provider,
            model: model.into(),
            api_key: api_key.into(),
            temperature: OutreachConfig::default().temperature,
            base_url: match provider {
                ProviderId::Anthropic => ANTHROPIC_BASE_URL.to_string(),
                ProviderId::OpenAI => OPENAI_BASE_URL.to_string(),
            },
        }
    }

    /// Build from configuration; fails when the provider key is missing
    pub fn from_config(config: &OutreachConfig) -> OutreachResult<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(config.provider, config.model.clone(), api_key, config.timeout)
            .with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Point at a different host, e.g. a proxy or a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post_json(&self, request: reqwest::RequestBuilder, body: Value) -> Result<Value, ApiFailure> {
        let response = request
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiFailure::from_status(status.as_u16(), text.trim()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiFailure::InvalidRequest(format!("Failed to parse response: {}", e)))
    }

    async fn call_anthropic(&self, prompt: &str, max_tokens: u32) -> Result<(String, TokenUsage), ApiFailure> {
        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);

        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let response_json = self.post_json(request, body).await?;

        let content = response_json
            .get("content")
            .and_then(|content| content.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ApiFailure::InvalidRequest("No content in response".to_string()))?;

        let usage = response_json.get("usage");
        Ok((
            content,
            TokenUsage {
                input_tokens: usage_count(usage, "input_tokens"),
                output_tokens: usage_count(usage, "output_tokens"),
            },
        ))
    }

    async fn call_openai(&self, prompt: &str, max_tokens: u32) -> Result<(String, TokenUsage), ApiFailure> {
        let request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key));

        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let response_json = self.post_json(request, body).await?;

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| ApiFailure::InvalidRequest("No content in response".to_string()))?;

        let usage = response_json.get("usage");
        Ok((
            content.to_string(),
            TokenUsage {
                input_tokens: usage_count(usage, "prompt_tokens"),
                output_tokens: usage_count(usage, "completion_tokens"),
            },
        ))
    }
}

#[async_trait]
impl ModelClient for RealModelClient {
    async fn call_model(&self, prompt: &str, max_tokens: u32) -> Result<ModelResponse, ApiFailure> {
        if self.api_key.trim().is_empty() {
            return Err(ApiFailure::AuthenticationFailed);
        }

        let request_start = Instant::now();
        let (text, usage) = match self.provider {
            ProviderId::Anthropic => self.call_anthropic(prompt, max_tokens).await?,
            ProviderId::OpenAI => self.call_openai(prompt, max_tokens).await?,
        };
        let response_time = request_start.elapsed();

        debug!(
            "{} {} responded in {}ms: {} in / {} out tokens",
            self.provider,
            self.model,
            response_time.as_millis(),
            usage.input_tokens,
            usage.output_tokens
        );

        Ok(ModelResponse {
            text,
            usage,
            model_used: self.model.clone(),
            response_time,
        })
    }
}

fn usage_count(usage: Option<&Value>, key: &str) -> u64 {
    usage
        .and_then(|u| u.get(key))
        .and_then(|t| t.as_u64())
        .unwrap_or(0)
}

fn classify_transport_error(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::Timeout
    } else {
        ApiFailure::NetworkError(error.to_string())
    }
}
