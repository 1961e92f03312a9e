//! Pairlink server binary.
//!
//! Loads configuration from the environment, wires the notification hub and
//! session manager together, and serves the HTTP/WebSocket API until Ctrl-C.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pairlink::adapters::{router, AppState, NotificationHub, SystemClock};
use pairlink::application::SessionManager;
use pairlink::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let hub = Arc::new(NotificationHub::new(
        config.notifications.observer_channel_capacity,
    ));
    let sessions = Arc::new(SessionManager::new(
        hub.clone(),
        Arc::new(SystemClock),
        config.pairing.ttl(),
    ));
    let app = router(AppState::new(sessions, hub));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %addr,
        environment = ?config.server.environment,
        pairing_ttl_secs = config.pairing.ttl_secs,
        "Pairlink listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Pairlink stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
