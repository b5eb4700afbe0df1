//! WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to the remote peer,
//! including outbound message delivery and lifecycle event reporting.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Outgoing messages from the relay (token, action envelopes)
//! - Incoming messages from the peer (logged only, never parsed)
//! - Closure detection, reported once on the transport event channel

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use futures_util::{SinkExt, StreamExt};
use serde_json::to_string;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

use crate::action::Action;
use crate::error::{Error, Result};
use crate::protocol::Envelope;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream over a possibly TLS-wrapped TCP connection.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// ConnectionId
// ============================================================================

/// Unique identifier for one opened connection.
///
/// Lifecycle actions carry this id so handlers can tell connections apart;
/// the live handle itself is published through
/// [`ConnectionManager`](super::ConnectionManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// TransportEvent
// ============================================================================

/// Lifecycle notification from the connection's event loop.
///
/// Consumed by the lifecycle middleware; replaces implicit callback timing
/// with an explicit channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection closed, locally or remotely. Emitted exactly once.
    Closed,
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Transmit the raw authentication token, no framing.
    Token(String),
    /// Serialize and transmit an action envelope.
    Emit(Envelope),
    /// Close the WebSocket and stop.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// The live bidirectional channel to the remote peer.
///
/// Cheaply cloneable handle over the event loop's command channel.
/// All sends are non-blocking enqueues; delivery order follows enqueue
/// order.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and can be shared across tasks.
#[derive(Clone)]
pub struct Connection {
    /// Identifier carried by lifecycle actions.
    id: ConnectionId,
    /// Endpoint the connection was opened against.
    endpoint: String,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl Connection {
    /// Opens a connection to the given endpoint.
    ///
    /// Spawns the event loop task internally and returns the handle together
    /// with the transport event channel the lifecycle handler consumes.
    /// There is no establishment timeout; a hung connect has no bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the connection cannot be established.
    pub async fn open(
        endpoint: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>)> {
        let (ws_stream, _) = connect_async(endpoint).await?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let id = ConnectionId::generate();

        debug!(connection = %id, endpoint, "WebSocket connection established");

        tokio::spawn(Self::run_event_loop(ws_stream, command_rx, event_tx, id));

        Ok((
            Self {
                id,
                endpoint: endpoint.to_string(),
                command_tx,
            },
            event_rx,
        ))
    }

    /// Returns this connection's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the endpoint this connection was opened against.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns `true` while the event loop is still accepting sends.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Enqueues the raw authentication token for transmission.
    ///
    /// The token is sent as plain text with no framing. Enqueue order is
    /// delivery order, so enqueueing the token before any action guarantees
    /// it is the first payload on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has stopped.
    pub fn send_token(&self, token: impl Into<String>) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Token(token.into()))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Enqueues an action for transmission under the given event name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has stopped.
    pub fn emit(&self, event_name: &str, action: &Action) -> Result<()> {
        trace!(connection = %self.id, kind = action.kind(), "Action enqueued");

        self.command_tx
            .send(ConnectionCommand::Emit(Envelope::new(
                event_name,
                action.clone(),
            )))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Requests closure of the connection.
    ///
    /// The event loop closes the WebSocket and reports
    /// [`TransportEvent::Closed`]; a shutdown of an already-stopped
    /// connection is a no-op.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that owns the WebSocket stream.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        event_tx: mpsc::UnboundedSender<TransportEvent>,
        id: ConnectionId,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from the peer
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            // Log only: no dispatch, no parsing
                            debug!(connection = %id, message = %text.as_str(), "Message received");
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!(connection = %id, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(connection = %id, error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!(connection = %id, "WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Outbound commands from the relay
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Token(token)) => {
                            if let Err(e) = ws_write.send(Message::Text(token.into())).await {
                                warn!(connection = %id, error = %e, "Failed to send token");
                            }
                        }

                        Some(ConnectionCommand::Emit(envelope)) => {
                            Self::handle_emit(envelope, &mut ws_write, id).await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!(connection = %id, "Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!(connection = %id, "Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Exactly one Closed per connection
        let _ = event_tx.send(TransportEvent::Closed);

        debug!(connection = %id, "Event loop terminated");
    }

    /// Serializes and transmits one envelope.
    async fn handle_emit(
        envelope: Envelope,
        ws_write: &mut futures_util::stream::SplitSink<WsStream, Message>,
        id: ConnectionId,
    ) {
        let json = match to_string(&envelope) {
            Ok(j) => j,
            Err(e) => {
                warn!(connection = %id, error = %e, "Failed to serialize envelope");
                return;
            }
        };

        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            warn!(connection = %id, error = %e, "Failed to emit action");
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("open", &self.is_open())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::net::TcpListener;
    use tokio::time::timeout;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    /// Binds a loopback WebSocket server that forwards received text frames.
    async fn spawn_test_server() -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");

            while let Some(Ok(message)) = ws.next().await {
                if let Message::Text(text) = message {
                    let _ = tx.send(text.as_str().to_string());
                }
            }
        });

        (format!("ws://{addr}"), rx)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        timeout(RECV_TIMEOUT, rx.recv())
            .await
            .expect("receive in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_token_is_first_payload() {
        let (endpoint, mut server_rx) = spawn_test_server().await;
        let (connection, _events) = Connection::open(&endpoint).await.expect("open");

        connection.send_token("secret-token").expect("send token");
        connection
            .emit("data", &Action::new("CART_ADD"))
            .expect("emit");

        assert_eq!(recv(&mut server_rx).await, "secret-token");

        let second = recv(&mut server_rx).await;
        assert!(second.contains(r#""event":"data""#));
        assert!(second.contains(r#""type":"CART_ADD""#));
    }

    #[tokio::test]
    async fn test_emit_wraps_action_in_envelope() {
        let (endpoint, mut server_rx) = spawn_test_server().await;
        let (connection, _events) = Connection::open(&endpoint).await.expect("open");

        let action = Action::new("B_X").with_field("n", 7);
        connection.emit("sync", &action).expect("emit");

        let wire: Envelope = serde_json::from_str(&recv(&mut server_rx).await).expect("parse");
        assert_eq!(wire.event, "sync");
        assert_eq!(wire.action, action);
    }

    #[tokio::test]
    async fn test_closed_event_on_shutdown() {
        let (endpoint, _server_rx) = spawn_test_server().await;
        let (connection, mut events) = Connection::open(&endpoint).await.expect("open");

        connection.shutdown();

        let event = timeout(RECV_TIMEOUT, events.recv())
            .await
            .expect("event in time");
        assert_eq!(event, Some(TransportEvent::Closed));

        // Channel ends after the single Closed event
        let end = timeout(RECV_TIMEOUT, events.recv()).await.expect("end");
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_closed_event_on_remote_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let endpoint = format!("ws://{}", listener.local_addr().expect("local addr"));

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");
            ws.close(None).await.expect("close");
        });

        let (_connection, mut events) = Connection::open(&endpoint).await.expect("open");

        let event = timeout(RECV_TIMEOUT, events.recv())
            .await
            .expect("event in time");
        assert_eq!(event, Some(TransportEvent::Closed));
    }

    #[tokio::test]
    async fn test_send_after_shutdown_is_connection_closed() {
        let (endpoint, _server_rx) = spawn_test_server().await;
        let (connection, mut events) = Connection::open(&endpoint).await.expect("open");

        connection.shutdown();
        let _ = timeout(RECV_TIMEOUT, events.recv()).await.expect("closed");

        // The event channel ending proves the loop task is gone
        let end = timeout(RECV_TIMEOUT, events.recv()).await.expect("end");
        assert_eq!(end, None);

        let result = connection.emit("data", &Action::new("CART_ADD"));
        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert!(!connection.is_open());
    }

    #[tokio::test]
    async fn test_open_against_refused_endpoint_fails() {
        // Bind then drop to get a port with no listener
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let endpoint = format!("ws://{}", listener.local_addr().expect("local addr"));
        drop(listener);

        let result = Connection::open(&endpoint).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_connection_error());
    }

    #[test]
    fn test_connection_id_display_is_stable() {
        let id = ConnectionId::generate();
        assert_eq!(id.to_string(), id.to_string());
        assert_ne!(id, ConnectionId::generate());
    }
}
