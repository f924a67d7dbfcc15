//! Ollama provider implementation.
//!
//! Talks to a local Ollama daemon over its HTTP API:
//! `POST /api/generate` for inference and `GET /api/tags` as a probe.

use super::{ProviderError, VisionProvider};
use crate::config::VlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub images: [&'a str; 1],
    /// Always false: the whole answer arrives as one JSON document.
    pub stream: bool,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, image_base64: &'a str) -> Self {
        Self {
            model,
            prompt,
            images: [image_base64],
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Ollama vision provider.
pub struct OllamaProvider {
    config: VlmConfig,
    client: Client,
}

impl OllamaProvider {
    pub fn new(config: VlmConfig) -> Result<Self, reqwest::Error> {
        // Per-request timeouts are set on each call: generation and probe differ.
        let client = Client::builder().build()?;

        Ok(Self { config, client })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url, path)
    }

    /// Map a transport-level failure onto a provider error.
    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Unreachable("Request to Ollama timed out".to_string())
        } else if err.is_connect() {
            ProviderError::Unreachable(format!(
                "Could not connect to Ollama at {}. Is it running?",
                self.config.base_url
            ))
        } else {
            unexpected(err)
        }
    }
}

fn unexpected(err: impl std::fmt::Display) -> ProviderError {
    ProviderError::Api(format!("Unexpected error querying Ollama: {}", err))
}

/// Best-effort extraction of `{"error": "..."}` from a failed response body.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(msg) => Some(msg.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl VisionProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, image_base64: &str) -> Result<String, ProviderError> {
        let request = GenerateRequest::new(&self.config.model, prompt, image_base64);
        let url = self.api_url("generate");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            image_len = image_base64.len(),
            "Sending request to Ollama"
        );

        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = api_error_message(&body)
                .unwrap_or_else(|| format!("{} for url: {}", status, url));

            return Err(ProviderError::Api(format!("Ollama API error: {}", detail)));
        }

        // Reading the body is bounded by the same timeout as the request.
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        let parsed: GenerateResponse = serde_json::from_slice(&body).map_err(|e| {
            ProviderError::Malformed(format!("Unexpected error querying Ollama: {}", e))
        })?;

        let text = parsed.response.ok_or_else(|| {
            ProviderError::Malformed(
                "Unexpected error querying Ollama: Ollama response missing 'response' field"
                    .to_string(),
            )
        })?;

        tracing::info!(
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_len = text.len(),
            "Ollama generation complete"
        );

        Ok(text)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.api_url("tags"))
            .timeout(self.config.probe_timeout())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Api(format!(
                "Ollama API error: {} for url: {}",
                response.status(),
                self.api_url("tags")
            )))
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
