//! Edit Timeline Server - Binary Entry Point
//!
//! Opens the event log and serves the HTTP/SSE API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edit_timeline::api::{create_router, AppState};
use edit_timeline::{EventStore, ServerConfig, TimelineResult};

#[tokio::main]
async fn main() {
    // Initialize logging before reading config so its warnings are visible
    let log_level = std::env::var("TIMELINE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        version = edit_timeline::VERSION,
        data_dir = %config.data_dir.display(),
        "timeline-server starting"
    );

    if let Err(e) = run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("timeline-server stopped");
}

async fn run(config: ServerConfig) -> TimelineResult<()> {
    let store_config = config.store_config();
    let store = tokio::task::spawn_blocking(move || EventStore::open(store_config))
        .await
        .map_err(|e| edit_timeline::TimelineError::Internal(e.to_string()))??;

    let state = Arc::new(AppState::new(Arc::new(store), config.session_config()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!(addr = %config.http_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Received shutdown signal");
}
