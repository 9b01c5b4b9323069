use anyhow::{Context, Result};
use std::net::SocketAddr;
use surfsup_config::AppConfig;
use surfsup_core::Dataset;
use surfsup_db::{DbClient, DbConnectionBuilder};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    surfsup_obs::init("surfsup");

    // Config
    let cfg = AppConfig::load().context("Failed to load configuration")?;
    let db_path = cfg.database_path();

    // Load the dataset once; the pool is closed before serving
    let opts = DbConnectionBuilder::new(&db_path).build();
    let db_client = DbClient::with_options(opts, cfg.max_connections())
        .await
        .with_context(|| format!("Failed to open dataset {}", db_path.display()))?;
    db_client.ping().await.context("Database ping failed")?;

    let dataset = db_client
        .load_dataset()
        .await
        .context("Failed to load dataset")?;
    db_client.close().await;
    info!(
        path = %db_path.display(),
        measurements = dataset.measurement_count(),
        stations = dataset.stations().len(),
        "Dataset loaded"
    );

    let (app, state) = surfsup_api::build_app(dataset)?;

    let addr: SocketAddr = cfg
        .http_bind()
        .parse()
        .context("Invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    // Mark ready just before serving
    surfsup_api::set_ready(&state, true);

    info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("SurfsUp server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
