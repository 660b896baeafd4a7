//! entity-store-server: the user and chat API over an in-memory backend.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise tracing.
//! 3. Build the backend (in-memory, bounded by the configured timeout).
//! 4. Serve HTTP until Ctrl-C / SIGTERM.

use std::sync::Arc;

use entity_store::config::Config;
use entity_store::{http, telemetry, InMemoryKv, SharedKv, TimeoutKv};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    telemetry::init(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "entity-store-server starting");

    let kv: SharedKv = Arc::new(TimeoutKv::new(InMemoryKv::new(), cfg.kv_timeout));
    let state = http::AppState::new(kv);
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_address).await?;
    info!(addr = %listener.local_addr()?, kv_timeout_ms = cfg.kv_timeout.as_millis() as u64, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("entity-store-server stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
