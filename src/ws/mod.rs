//! WebSocket layer: upgrade handler, connection loop, wire types.
//!
//! The WebSocket endpoint at `/` sends one event on connect and one event
//! per client text message.

pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::{CloseReason, run_connection};
pub use messages::{ClientMessage, Event};
