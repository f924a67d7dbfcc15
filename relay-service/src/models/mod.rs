//! Request and response shapes of the chat endpoint.

pub mod chat;

pub use chat::{strip_data_url_prefix, ChatRequest, ChatResponse, ErrorResponse};
