//! Mock provider implementation for testing.

use super::{ProviderError, VisionProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub image_base64: String,
}

/// In-process provider returning a scripted outcome and recording every call.
pub struct MockVisionProvider {
    outcome: Result<String, ProviderError>,
    healthy: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVisionProvider {
    /// A provider that answers every prompt with `answer`.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            outcome: Ok(answer.into()),
            healthy: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider that fails every prompt with `error`.
    pub fn failing(error: ProviderError) -> Self {
        let healthy = !matches!(error, ProviderError::Unreachable(_));
        Self {
            outcome: Err(error),
            healthy,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate(&self, prompt: &str, image_base64: &str) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                image_base64: image_base64.to_string(),
            });
        }

        self.outcome.clone()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::Unreachable(
                "Mock VLM provider is offline".to_string(),
            ))
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
