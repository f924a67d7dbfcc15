use relay_service::config::RelayConfig;
use relay_service::services::providers::verify_connectivity;
use relay_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = RelayConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("relay-service", "info", config.otlp_endpoint.as_deref());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        vlm_url = %config.vlm.base_url,
        model = %config.vlm.model,
        "Starting VLM relay service"
    );

    let address = config.common.address();

    let app = Application::build(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    // Best effort: the relay starts even when the VLM is down.
    verify_connectivity(app.provider()).await;

    tracing::info!("Server starting on http://{} (port {})", address, app.port());

    app.run_until_stopped().await
}
