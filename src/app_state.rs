//! Shared application state injected into the Axum handler.

use crate::config::{ConnectionSettings, ServerConfig};

/// Application state available to handlers via Axum's `State` extractor.
///
/// Holds configuration only; connections never share mutable state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    /// Settings applied to every upgraded connection.
    pub connection: ConnectionSettings,
}

impl From<&ServerConfig> for AppState {
    fn from(config: &ServerConfig) -> Self {
        Self {
            connection: config.connection,
        }
    }
}
