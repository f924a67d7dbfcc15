use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// A validated inbound chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    /// Base64 payload with any `data:<mime>;base64,` prefix removed.
    pub image: String,
}

/// Successful reply to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Failed reply to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ChatRequest {
    /// Validate a raw request body.
    ///
    /// Checks run in a fixed order so the first problem found is the one
    /// reported: JSON, presence of `message`, presence of `image`, then the
    /// type and emptiness of each.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let data: Value = serde_json::from_slice(body).map_err(|_| not_json())?;

        if data.is_null() {
            return Err(not_json());
        }

        // A JSON array or scalar has no fields at all.
        let fields = data.as_object();

        let message = fields
            .and_then(|f| f.get("message"))
            .ok_or_else(|| RelayError::MalformedInput("Missing 'message' field in request".into()))?;

        let image = fields
            .and_then(|f| f.get("image"))
            .ok_or_else(|| RelayError::MalformedInput("Missing 'image' field in request".into()))?;

        let message = non_empty_str(message)
            .ok_or_else(|| RelayError::MalformedInput("'message' must be a non-empty string".into()))?;

        let image = non_empty_str(image)
            .ok_or_else(|| RelayError::MalformedInput("'image' must be a non-empty string".into()))?;

        Ok(Self {
            message: message.to_string(),
            image: strip_data_url_prefix(image).to_string(),
        })
    }
}

pub(crate) fn not_json() -> RelayError {
    RelayError::MalformedInput("Request body must be JSON".into())
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Drop everything up to and including the first comma.
///
/// Only the first comma splits; the remainder is kept verbatim, so
/// `"data:image/png;base64,AAAA"` becomes `"AAAA"` and `"AAAA"` is unchanged.
pub fn strip_data_url_prefix(image: &str) -> &str {
    match image.split_once(',') {
        Some((_, payload)) => payload,
        None => image,
    }
}
