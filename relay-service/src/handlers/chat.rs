use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};

use crate::error::RelayError;
use crate::models::chat::not_json;
use crate::models::{ChatRequest, ChatResponse};
use crate::startup::AppState;

/// `POST /chat`: validate, forward to the VLM, relay the answer.
///
/// Dropping this future (client disconnect) also drops the in-flight
/// upstream request.
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    if !is_json_content_type(&headers) {
        return Err(not_json());
    }

    let body = body.map_err(body_rejection)?;

    let request = ChatRequest::parse(&body)?;

    tracing::info!(
        model = %state.provider.model(),
        message_len = request.message.len(),
        image_len = request.image.len(),
        "Relaying chat request"
    );

    let response = state
        .provider
        .generate(&request.message, &request.image)
        .await?;

    Ok(Json(ChatResponse { response }))
}

/// An unreadable body is reported like an unparseable one, except for the
/// size limit which keeps its 413.
fn body_rejection(rejection: BytesRejection) -> RelayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge(rejection.body_text())
    } else {
        tracing::debug!(error = %rejection.body_text(), "Failed to read chat body");
        not_json()
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
