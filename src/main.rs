//! Hit & Dodge Server - Authoritative multiplayer game server
//!
//! This is the main entry point for the game server. It handles:
//! - TCP connections speaking the line-oriented game protocol
//! - Room lifecycle from lobby to game over
//! - HTTP status endpoints for deployment checks

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hit_dodge_server::app::AppState;
use hit_dodge_server::config::Config;
use hit_dodge_server::http::build_router;
use hit_dodge_server::net::handler;
use hit_dodge_server::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Hit & Dodge Server");

    // Create application state
    let state = AppState::new(config.clone());

    // Status endpoints run beside the game port
    let router = build_router(state.clone());
    let http_listener = TcpListener::bind(config.http_addr).await?;
    info!("Status endpoints: http://{}/health", config.http_addr);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(http_listener, router).await {
            error!(error = %err, "status endpoint server failed");
        }
    });

    // Game protocol listener
    let listener = TcpListener::bind(config.server_addr).await?;
    info!("Game protocol listening on {}", config.server_addr);

    tokio::select! {
        _ = handler::serve(listener, state) => {}
        _ = shutdown_signal() => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
