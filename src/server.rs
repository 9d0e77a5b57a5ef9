//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, service wiring and the Axum server lifecycle.

use crate::application::services::PublicationService;
use crate::config::Config;
use crate::domain::store::DataClient;
use crate::infrastructure::build_store;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The configured data store (PostgreSQL pool and migrations, or local storage)
/// - The change-notification channel
/// - The publication service
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// A storage check failure at startup is logged but not fatal: the dashboard
/// renders its error state until storage becomes reachable.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = build_store(&config).await?;
    let client = DataClient::new(store);

    if let Err(e) = client.health_check().await {
        tracing::warn!(error = %e, backend = client.backend(), "Storage check failed at startup");
    }

    let (events, _) = broadcast::channel(config.event_channel_capacity);
    let service = Arc::new(PublicationService::new(client, events));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState::new(service).with_shutdown(shutdown_rx);

    let app = app_router(state, &config.static_dir);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C and tells open event streams to finish.
async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    shutdown.send_replace(true);
}
