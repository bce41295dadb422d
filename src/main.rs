use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carteirinha_relay::api::{self, state::AppState};
use carteirinha_relay::config::Config;
use carteirinha_relay::services::portal::PortalClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carteirinha_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting carteirinha relay...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        portal = %config.portal.base_url(),
        timeout_secs = config.portal.timeout().as_secs(),
        "Configuration loaded successfully"
    );

    let portal = PortalClient::new(config.portal.clone()).context("failed to build portal client")?;
    let app = api::router(AppState::new(portal));

    // Start server
    let listener = api::bind(&config.host, config.port)
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
