//! Transport for the OpenAI Responses API.
//!
//! Works with OpenAI and any endpoint exposing `POST {base}/responses` and
//! `GET {base}/responses/{id}` with bearer authentication.
//!
//! Error mapping:
//! - 400 whose body names an unsupported optional parameter → `ParameterRejected`
//! - 401 / 403 → `AuthenticationFailed`
//! - 429 → `RateLimited` (honoring `Retry-After` when present)
//! - any other non-2xx → `ApiError`

use async_trait::async_trait;
use reporter_config::ApiConfig;
use reporter_core::error::{ProviderError, RejectedParameter};
use reporter_core::{ReasoningEffort, RequestDescriptor, ResponsePayload, ResponsesTransport, Verbosity};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub struct OpenAiResponsesTransport {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiResponsesTransport {
    /// Create a transport for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: "openai".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build from the `[api]` config section. Fails without an API key.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured(
                    "No API key found. Set OPENAI_API_KEY or api.api_key in reporter.toml".into(),
                )
            })?;
        Self::new(
            config.base_url.as_str(),
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle(&self, response: reqwest::Response) -> Result<ResponsePayload, ProviderError> {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            let message = error_message(&error_body);
            warn!(provider = %self.name, status, message = %message, "Provider returned error");

            if status == 400 {
                if let Some(parameter) = RejectedParameter::from_message(&error_body) {
                    return Err(ProviderError::ParameterRejected { parameter, message });
                }
            }
            return Err(ProviderError::ApiError {
                status_code: status,
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;
        Ok(ResponsePayload::new(body))
    }
}

#[async_trait]
impl ResponsesTransport for OpenAiResponsesTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create(&self, request: &RequestDescriptor) -> Result<ResponsePayload, ProviderError> {
        let url = format!("{}/responses", self.base_url);
        let body = CreateBody::from(request);

        debug!(provider = %self.name, model = %request.model, "Creating response");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        self.handle(response).await
    }

    async fn retrieve(&self, response_id: &str) -> Result<ResponsePayload, ProviderError> {
        let url = format!("{}/responses/{}", self.base_url, response_id);

        debug!(provider = %self.name, id = %response_id, "Retrieving response");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        self.handle(response).await
    }
}

/// `error.message` from a JSON error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ReasoningParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextParam>,
}

#[derive(Debug, Serialize)]
struct ReasoningParam {
    effort: ReasoningEffort,
}

#[derive(Debug, Serialize)]
struct TextParam {
    verbosity: Verbosity,
}

impl<'a> From<&'a RequestDescriptor> for CreateBody<'a> {
    fn from(request: &'a RequestDescriptor) -> Self {
        Self {
            model: &request.model,
            instructions: &request.instructions,
            input: &request.input,
            previous_response_id: request.previous_response_id.as_deref(),
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
            reasoning: request.reasoning_effort.map(|effort| ReasoningParam { effort }),
            text: request.verbosity.map(|verbosity| TextParam { verbosity }),
        }
    }
}
