//! Server configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default, so the server
//! starts with an empty environment.

use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::ServerError;

/// Default bind address when `LISTEN_ADDR` is not set.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default upper bound for a single inbound WebSocket message (4 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Output format of the tracing subscriber.
    pub log_format: LogFormat,

    /// Per-connection WebSocket settings handed to every handler.
    pub connection: ConnectionSettings,
}

/// Settings applied to each upgraded WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Largest inbound message accepted before the connection is dropped.
    pub max_message_size: usize,

    /// What the connection handler does with a payload it cannot parse.
    pub malformed_policy: MalformedPolicy,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            malformed_policy: MalformedPolicy::default(),
        }
    }
}

/// Reaction to a client text message that is not a valid `{"c": <int>}`
/// object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Send a protocol-error close frame and end the connection.
    #[default]
    Close,
    /// Log the payload and keep waiting for the next message.
    Ignore,
}

impl FromStr for MalformedPolicy {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "close" => Ok(Self::Close),
            "ignore" => Ok(Self::Ignore),
            other => Err(ServerError::Config(format!(
                "unknown malformed policy: {other}"
            ))),
        }
    }
}

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ServerError::Config(format!("unknown log format: {other}"))),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or cannot be
    /// parsed. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if `LISTEN_ADDR` is set but cannot
    /// be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ServerError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// [`ServerConfig::from_env`] passes the process environment; tests pass
    /// a closure over a fixed table.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the listen address is present but
    /// invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid LISTEN_ADDR {raw_addr:?}: {e}")))?;

        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::default());
        let max_message_size = parse_or(&lookup, "WS_MAX_MESSAGE_SIZE", DEFAULT_MAX_MESSAGE_SIZE);
        let malformed_policy = parse_or(&lookup, "WS_MALFORMED_POLICY", MalformedPolicy::default());

        Ok(Self {
            listen_addr,
            log_format,
            connection: ConnectionSettings {
                max_message_size,
                malformed_policy,
            },
        })
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ServerError> {
        let table: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| table.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let Ok(config) = config_from(&[]) else {
            panic!("defaults must parse");
        };
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.connection, ConnectionSettings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let Ok(config) = config_from(&[
            ("LISTEN_ADDR", "127.0.0.1:9001"),
            ("LOG_FORMAT", "JSON"),
            ("WS_MAX_MESSAGE_SIZE", "1024"),
            ("WS_MALFORMED_POLICY", "ignore"),
        ]) else {
            panic!("valid overrides must parse");
        };
        assert_eq!(config.listen_addr.port(), 9001);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.connection.max_message_size, 1024);
        assert_eq!(config.connection.malformed_policy, MalformedPolicy::Ignore);
    }

    #[test]
    fn listen_addr_is_trimmed() {
        let Ok(config) = config_from(&[("LISTEN_ADDR", " 127.0.0.1:80\n")]) else {
            panic!("padded address must parse");
        };
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:80");
    }

    #[test]
    fn invalid_listen_addr_is_an_error() {
        let result = config_from(&[("LISTEN_ADDR", "not-an-address")]);
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn invalid_optional_values_fall_back() {
        let Ok(config) = config_from(&[
            ("WS_MAX_MESSAGE_SIZE", "lots"),
            ("WS_MALFORMED_POLICY", "explode"),
        ]) else {
            panic!("optional values never fail");
        };
        assert_eq!(config.connection.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.connection.malformed_policy, MalformedPolicy::Close);
    }

    #[test]
    fn policy_parsing_is_case_insensitive() {
        assert_eq!("CLOSE".parse::<MalformedPolicy>().ok(), Some(MalformedPolicy::Close));
        assert!("drop".parse::<MalformedPolicy>().is_err());
    }
}
