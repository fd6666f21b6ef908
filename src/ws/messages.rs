//! Wire types: the server `Event` and the client count message.

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;

/// Server → client payload: `{"c": <count>, "ts": <unix seconds>}`.
///
/// Built right before it is sent and dropped right after serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Count echoed from the triggering client message, `0` on connect.
    #[serde(rename = "c")]
    pub count: i64,
    /// Server Unix time in seconds when the event was built.
    #[serde(rename = "ts")]
    pub timestamp: i64,
}

impl Event {
    /// Creates an event with an explicit timestamp.
    #[must_use]
    pub const fn new(count: i64, timestamp: i64) -> Self {
        Self { count, timestamp }
    }

    /// Creates an event stamped with the current server time.
    #[must_use]
    pub fn now(count: i64) -> Self {
        Self::new(count, unix_timestamp())
    }

    /// The event sent right after the handshake.
    #[must_use]
    pub fn initial() -> Self {
        Self::now(0)
    }

    /// Serializes the event to its JSON text form.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Two integer fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Current server time in whole Unix seconds.
#[must_use]
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Client → server payload. Only the `c` field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientMessage {
    /// Count the client wants echoed back.
    pub count: i64,
}

impl ClientMessage {
    /// Parses a text frame into a [`ClientMessage`].
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when the text is not JSON, is not an
    /// object, lacks `c`, or carries a `c` that is not an `i64` integer.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;
        let raw = object.get("c").ok_or(ProtocolError::MissingCount)?;
        let count = raw
            .as_i64()
            .ok_or_else(|| ProtocolError::NonIntegerCount(preview(raw)))?;
        Ok(Self { count })
    }
}

/// Longest slice of a client string echoed back in an error.
pub const MAX_PREVIEW_LEN: usize = 32;

/// Short description of an offending value, bounded regardless of its size.
fn preview(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.len() > MAX_PREVIEW_LEN => {
            let mut end = MAX_PREVIEW_LEN;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            format!("string {:?}...", s.get(..end).unwrap_or_default())
        }
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
