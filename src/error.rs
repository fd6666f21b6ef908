//! Error types for the server and for client payload validation.
//!
//! [`ProtocolError`] covers a single malformed client message and maps to a
//! WebSocket close frame. [`ServerError`] covers startup failures and never
//! reaches a connection.

use axum::extract::ws::{CloseCode, close_code};

/// Longest close reason allowed by RFC 6455 (125 byte payload minus the
/// 2 byte code).
pub const MAX_CLOSE_REASON_LEN: usize = 123;

/// A client text message that is not a JSON object with an integer `c`.
///
/// # Close Codes
///
/// | Variant           | Code | Meaning        |
/// |-------------------|------|----------------|
/// | `InvalidJson`     | 1002 | Protocol error |
/// | `NotAnObject`     | 1002 | Protocol error |
/// | `MissingCount`    | 1002 | Protocol error |
/// | `NonIntegerCount` | 1002 | Protocol error |
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Payload is not valid JSON.
    #[error("malformed JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Payload is valid JSON but not an object.
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// Object has no `c` field.
    #[error("missing field \"c\"")]
    MissingCount,

    /// `c` is present but is not an integer that fits in `i64`; carries a
    /// bounded preview of the value.
    #[error("field \"c\" must be an integer, got {0}")]
    NonIntegerCount(String),
}

impl ProtocolError {
    /// Returns the WebSocket close code sent to the peer for this error.
    #[must_use]
    pub const fn close_code(&self) -> CloseCode {
        match self {
            Self::InvalidJson(_)
            | Self::NotAnObject
            | Self::MissingCount
            | Self::NonIntegerCount(_) => close_code::PROTOCOL,
        }
    }

    /// Returns the close frame reason, truncated to fit a control frame.
    #[must_use]
    pub fn close_reason(&self) -> String {
        let mut reason = self.to_string();
        if reason.len() > MAX_CLOSE_REASON_LEN {
            let mut end = MAX_CLOSE_REASON_LEN;
            while !reason.is_char_boundary(end) {
                end -= 1;
            }
            reason.truncate(end);
        }
        reason
    }
}

/// Failures that prevent the server from starting or keep it from serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A configuration value could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// Binding or serving the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
