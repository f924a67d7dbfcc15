//! Request-scoped failures and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::providers::ProviderError;

/// Everything that can go wrong while relaying one chat request.
///
/// Every variant renders as `{"error": ...}`; none is retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Body not JSON, or a required field missing, empty or not a string.
    #[error("{0}")]
    MalformedInput(String),

    /// The body exceeds the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The inference service could not be reached or did not answer in time.
    #[error("VLM service unavailable: {0}")]
    UpstreamUnreachable(String),

    /// The inference service answered with an error.
    #[error("{0}")]
    UpstreamError(String),

    /// The inference service answered successfully but without an answer.
    #[error("{0}")]
    UpstreamMalformed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::UpstreamUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::UpstreamError(_)
            | RelayError::UpstreamMalformed(_)
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unreachable(msg) => RelayError::UpstreamUnreachable(msg),
            ProviderError::Api(msg) => RelayError::UpstreamError(msg),
            ProviderError::Malformed(msg) => RelayError::UpstreamMalformed(msg),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Chat request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Rejected chat request");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelayError::MalformedInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::PayloadTooLarge("x".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            RelayError::UpstreamUnreachable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RelayError::UpstreamError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::UpstreamMalformed("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        let err: RelayError = ProviderError::Unreachable("Request to Ollama timed out".into()).into();
        assert_eq!(
            err.to_string(),
            "VLM service unavailable: Request to Ollama timed out"
        );

        let err: RelayError = ProviderError::Api("Ollama API error: bad model".into()).into();
        assert_eq!(err.to_string(), "Ollama API error: bad model");

        assert_eq!(
            RelayError::Internal("boom".into()).to_string(),
            "Internal server error: boom"
        );
    }
}
