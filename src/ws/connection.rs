//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection: one
//! initial event, then one event per client text message, until the peer
//! goes away.

use std::fmt::Display;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::Instrument;

use super::messages::{ClientMessage, Event};
use crate::config::{ConnectionSettings, MalformedPolicy};

/// Why a connection loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer sent a close frame.
    PeerClosed,
    /// Inbound stream ended without a close frame.
    StreamEnded,
    /// Reading from the transport failed.
    TransportError,
    /// Writing an event to the transport failed.
    SendFailed,
    /// Client sent a malformed payload and the policy is to close.
    ProtocolViolation,
}

impl CloseReason {
    /// Returns `true` if the connection ended without a clean close.
    #[must_use]
    pub const fn is_abnormal(self) -> bool {
        !matches!(self, Self::PeerClosed | Self::StreamEnded)
    }
}

/// Runs the read/write loop for a single upgraded WebSocket.
///
/// Every connection gets its own `conn_id` span; nothing is shared with
/// other connections.
pub async fn run_connection(socket: WebSocket, settings: ConnectionSettings) -> CloseReason {
    let conn_id = uuid::Uuid::new_v4();
    let span = tracing::debug_span!("ws_connection", %conn_id);

    async move {
        tracing::debug!("ws connection opened");
        let (mut ws_tx, mut ws_rx) = socket.split();

        let reason = drive(&mut ws_tx, &mut ws_rx, settings).await;

        // Flushes any pending close reply; the peer may already be gone.
        let _ = ws_tx.close().await;

        log_close(reason);
        reason
    }
    .instrument(span)
    .await
}

/// Drives one connection over an already split sink/stream pair.
///
/// Sends [`Event::initial`], then answers each text message in receipt
/// order. Binary, ping and pong frames are skipped.
pub async fn drive<Tx, Rx, E>(
    ws_tx: &mut Tx,
    ws_rx: &mut Rx,
    settings: ConnectionSettings,
) -> CloseReason
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    if let Err(e) = send_event(ws_tx, Event::initial()).await {
        tracing::debug!(error = %e, "failed to send initial event");
        return CloseReason::SendFailed;
    }

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => match ClientMessage::parse(text.as_str()) {
                Ok(client_msg) => {
                    if let Err(e) = send_event(ws_tx, Event::now(client_msg.count)).await {
                        tracing::debug!(error = %e, "failed to send event");
                        return CloseReason::SendFailed;
                    }
                }
                Err(err) => match settings.malformed_policy {
                    MalformedPolicy::Ignore => {
                        tracing::warn!(error = %err, "ignoring malformed client payload");
                    }
                    MalformedPolicy::Close => {
                        tracing::warn!(error = %err, "closing connection on malformed payload");
                        let frame = CloseFrame {
                            code: err.close_code(),
                            reason: err.close_reason().into(),
                        };
                        if let Err(e) = ws_tx.send(Message::Close(Some(frame))).await {
                            tracing::debug!(error = %e, "failed to send close frame");
                        }
                        return CloseReason::ProtocolViolation;
                    }
                },
            },
            Ok(Message::Close(_)) => return CloseReason::PeerClosed,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "ws receive error");
                return CloseReason::TransportError;
            }
        }
    }

    CloseReason::StreamEnded
}

fn log_close(reason: CloseReason) {
    tracing::debug!(?reason, abnormal = reason.is_abnormal(), "ws connection closed");
}

async fn send_event<Tx>(ws_tx: &mut Tx, event: Event) -> Result<(), Tx::Error>
where
    Tx: Sink<Message> + Unpin,
{
    tracing::trace!(count = event.count, ts = event.timestamp, "sending event");
    ws_tx.send(Message::text(event.to_json())).await
}
