use service_core::observability::init_tracing;
use stylize_service::config::StylizeConfig;
use stylize_service::services::init_metrics;
use stylize_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration first; it selects the OTLP endpoint for tracing
    let config = StylizeConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("stylize-service", "info", config.otlp_endpoint.as_deref());

    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    tracing::info!(
        environment = %config.common.environment,
        store = ?config.store.backend,
        image_host = ?config.image_host.kind,
        "Starting stylize-service"
    );

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    application.run_until_stopped().await
}
