//! # tick-socket
//!
//! Minimal WebSocket server. Every client receives a `{"c": 0, "ts": ..}`
//! event right after the handshake and a `{"c": n, "ts": ..}` event for
//! every `{"c": n}` text message it sends, until it disconnects.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── Router, GET / (server)
//!     ├── Upgrade handler (ws/handler)
//!     │
//!     └── Connection loop, one task per client (ws/connection)
//!             └── Event / ClientMessage (ws/messages)
//! ```
//!
//! Connections share no state; a malformed payload or a dropped peer only
//! ends the affected connection.

pub mod app_state;
pub mod config;
pub mod error;
pub mod server;
pub mod ws;
