//! End-to-end tests against a running relay bound to a random port.

use relay_service::config::{RelayConfig, VlmConfig};
use relay_service::services::providers::mock::MockVisionProvider;
use relay_service::services::providers::{ProviderError, VisionProvider};
use relay_service::startup::Application;
use reqwest::Client;
use serde_json::{json, Value};
use service_core::config::Config as CommonConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> RelayConfig {
    RelayConfig {
        common: CommonConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        vlm: VlmConfig::default(),
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        max_body_bytes: 1024 * 1024,
        otlp_endpoint: None,
    }
}

/// Spawn the application on a random port and return the port number.
async fn spawn_app(provider: Arc<dyn VisionProvider>) -> u16 {
    let app = Application::build_with_provider(test_config(), provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app(Arc::new(MockVisionProvider::answering("unused"))).await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "relay-service");
}

#[tokio::test]
async fn readiness_follows_upstream_health() {
    let ready = spawn_app(Arc::new(MockVisionProvider::answering("unused"))).await;
    let not_ready = spawn_app(Arc::new(MockVisionProvider::failing(
        ProviderError::Unreachable("offline".to_string()),
    )))
    .await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/ready", ready))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .get(format!("http://127.0.0.1:{}/ready", not_ready))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn index_and_static_assets_are_served() {
    let port = spawn_app(Arc::new(MockVisionProvider::answering("unused"))).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("VLM Camera Demo"));

    let response = client
        .get(format!("http://127.0.0.1:{}/index.html", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("http://127.0.0.1:{}/missing.js", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn chat_round_trip_over_http() {
    let provider = Arc::new(MockVisionProvider::answering("a cat"));
    let port = spawn_app(provider.clone()).await;

    let response = Client::new()
        .post(format!("http://127.0.0.1:{}/chat", port))
        .json(&json!({"message": "What is this?", "image": "data:image/jpeg;base64,AAAA"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"response": "a cat"}));
    assert_eq!(provider.calls()[0].image_base64, "AAAA");
}
