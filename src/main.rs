//! tick-socket server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket endpoint at `/`.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tick_socket::app_state::AppState;
use tick_socket::config::{LogFormat, ServerConfig};
use tick_socket::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        max_message_size = config.connection.max_message_size,
        malformed_policy = ?config.connection.malformed_policy,
        "starting tick-socket"
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;

    server::serve(listener, AppState::from(&config), server::shutdown_signal())
        .await
        .context("serving websocket connections")?;

    Ok(())
}
