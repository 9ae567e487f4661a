// Paralympics - Web Server
// Pages for Games editions + JSON CRUD for regions

use anyhow::{Context, Result};
use clap::Parser;
use paralympics_iris::config::ParalympicsConfig;
use paralympics_iris::paralympics::routes::{router, AppState};
use paralympics_iris::{logging, open_database};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(logging::DEFAULT_FILTER);
    let config = ParalympicsConfig::parse();

    tracing::info!("🌐 Paralympics web server v{}", paralympics_iris::VERSION);

    let conn = open_database(&config.db)?;
    tracing::info!(path = %config.db.display(), "✓ Database opened");

    let app = router(AppState::new(conn)).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!("🚀 Server running on http://{}", config.bind);
    tracing::info!("   API: http://{}/noc", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutting down");
}
