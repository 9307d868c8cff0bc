//! Dockside Gateway - HTTP API for container lifecycle management
//!
//! This is the main entry point for the gateway service. It connects to the
//! local container daemon, verifies it is reachable, and serves the API
//! until interrupted.
//!
//! # Environment
//!
//! - `LISTEN_ADDR` - address to bind (default `0.0.0.0:8080`)
//! - `DOCKER_HOST` - daemon endpoint, read by the daemon client
//! - `DOCKER_TIMEOUT_SECONDS` - daemon request timeout (default 120)
//! - `DOCKER_STOP_TIMEOUT_SECONDS` - grace period before a stop kills (default 10)
//! - `RUST_LOG` - log filter (default `info,dockside=debug`)

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::Request;
use axum::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dockside_daemon::{DaemonClient, DaemonConfig, DockerDaemon};
use dockside_gateway::{create_app, GatewayConfig, GatewayState};
use dockside_lifecycle::LifecycleManager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dockside=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dockside Gateway");

    // Load configuration from environment
    let mut gateway_config = GatewayConfig::default();
    if let Ok(listen_addr) = std::env::var("LISTEN_ADDR") {
        gateway_config.listen_addr = listen_addr;
    }

    let mut daemon_config = DaemonConfig::default();
    if let Some(timeout) = env_parse("DOCKER_TIMEOUT_SECONDS") {
        daemon_config.timeout_seconds = timeout;
    }
    if let Some(stop_timeout) = env_parse("DOCKER_STOP_TIMEOUT_SECONDS") {
        daemon_config.stop_timeout_seconds = stop_timeout;
    }

    tracing::info!(
        listen_addr = %gateway_config.listen_addr,
        docker_host = ?std::env::var("DOCKER_HOST").ok(),
        timeout_seconds = daemon_config.timeout_seconds,
        stop_timeout_seconds = daemon_config.stop_timeout_seconds,
        "Gateway configuration loaded"
    );

    // Connect to the daemon and fail fast if it is not there
    let daemon = Arc::new(DockerDaemon::connect(&daemon_config)?);
    if let Err(err) = daemon.ping().await {
        tracing::error!(error = %err, "Container daemon is unreachable");
        return Err(err.into());
    }
    tracing::info!("Connected to container daemon");

    let lifecycle = Arc::new(LifecycleManager::new(daemon));
    let listen_addr = gateway_config.listen_addr.clone();
    let state = GatewayState::new(lifecycle, gateway_config);

    let app = create_app(state);
    tracing::info!("Router configured");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Read and parse an environment variable, ignoring it if malformed.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring malformed environment variable");
            None
        }
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
