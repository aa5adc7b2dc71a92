//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! - The API key travels as the `key` query parameter, as the endpoint expects.
//! - `429` responses are retried with exponential backoff; every other
//!   non-success status fails immediately with the raw body as the reason.
//! - Transport faults become `GenerationFailure`s, never panics or `Err`s of
//!   another type.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::Config;
use crate::error::{AppError, AppResult, GenerationFailure};
use crate::gemini::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, RequestPart};
use crate::gemini::{GenerationRequest, GenerationResult, ImageGenerator};

/// Backoff before retry `i` (0-indexed) is `unit * growth^i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub growth: f64,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { max_retries: 3, growth: 1.5, unit: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    /// Growth must be finite and at least 1.0 so delays never shrink.
    pub fn validate(&self) -> AppResult<()> {
        if !self.growth.is_finite() || self.growth < 1.0 {
            return Err(AppError::Config(format!(
                "backoff growth must be a finite value >= 1.0, got {}",
                self.growth
            )));
        }
        Ok(())
    }

    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.unit.as_secs_f64() * self.growth.powi(exp);
        Duration::try_from_secs_f64(secs).unwrap_or(if secs.is_nan() { Duration::ZERO } else { Duration::MAX })
    }

    /// Sum of all backoff sleeps when every attempt is rate limited.
    pub fn worst_case_backoff(&self) -> Duration {
        (0..self.max_retries).map(|i| self.delay(i)).sum()
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_url: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> AppResult<Self> {
        retry.validate()?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(GeminiClient { client, api_url: api_url.into(), retry })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.api_url.clone(), config.request_timeout, config.retry)
    }

    fn build_payload(request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(request.images.len() + 1);
        parts.push(RequestPart::Text { text: request.prompt.clone() });
        for image in &request.images {
            parts.push(RequestPart::InlineData {
                inline_data: InlineData {
                    data: image.data.clone(),
                    mime_type: Some(image.media_type.clone()),
                },
            });
        }
        GenerateContentRequest { contents: vec![Content { parts }] }
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let payload = Self::build_payload(&request);
        tracing::debug!(images = request.images.len(), prompt_len = request.prompt.len(), "Calling generation endpoint");

        let mut attempt: u32 = 0;
        loop {
            let response = self
                .client
                .post(&self.api_url)
                .query(&[("key", request.api_key.as_str())])
                .json(&payload)
                .send()
                .await
                .map_err(GenerationFailure::from_transport)?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.ok();
                if attempt >= self.retry.max_retries {
                    tracing::error!(attempts = attempt + 1, "Still rate limited after final retry");
                    return Err(GenerationFailure::RateLimited { last_body: body });
                }
                let delay = self.retry.delay(attempt);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "Rate limited, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error body".to_string());
                tracing::error!(status = status.as_u16(), "Generation request failed");
                return Err(GenerationFailure::Upstream { status: status.as_u16(), body });
            }

            let bytes = response.bytes().await.map_err(GenerationFailure::from_transport)?;
            let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
                .map_err(|e| GenerationFailure::Malformed(e.to_string()))?;

            return match parsed.first_image() {
                Some(image) => {
                    tracing::info!(media_type = %image.media_type, b64_len = image.data.len(), "Image generated");
                    Ok(image)
                }
                None => {
                    tracing::warn!(candidates = parsed.candidates.len(), "Response carried no inline image");
                    Err(GenerationFailure::NoImage)
                }
            };
        }
    }
}
