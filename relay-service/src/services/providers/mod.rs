//! Vision-language model provider abstractions and implementations.
//!
//! Handlers only see the [`VisionProvider`] trait, so the Ollama client can
//! be swapped for the in-process mock in tests.

pub mod mock;
pub mod ollama;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Connection refused, DNS failure or timeout.
    #[error("{0}")]
    Unreachable(String),

    /// The service answered with an error status, or the exchange failed
    /// in some other unexpected way.
    #[error("{0}")]
    Api(String),

    /// A successful answer without the expected content.
    #[error("{0}")]
    Malformed(String),
}

/// A service that answers a text prompt about a single image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one prompt with one base64 image and wait for the full answer.
    async fn generate(&self, prompt: &str, image_base64: &str) -> Result<String, ProviderError>;

    /// Cheap reachability check.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Model name used for log fields.
    fn model(&self) -> &str;
}

/// Probe the inference service once at startup.
///
/// Never fails: an unreachable service is logged with a remediation hint
/// and startup carries on.
pub async fn verify_connectivity(provider: &dyn VisionProvider) -> bool {
    match provider.health_check().await {
        Ok(()) => {
            tracing::info!(model = %provider.model(), "VLM connection verified");
            true
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                hint = "docker run -d -p 11434:11434 --name ollama ollama/ollama",
                "Could not connect to the VLM service. Make sure Ollama is running"
            );
            false
        }
    }
}
