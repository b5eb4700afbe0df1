//! Connection lifecycle handler.
//!
//! Reacts to the two trigger actions and translates transport-level
//! lifecycle transitions into actions dispatched back into the pipeline.
//!
//! # State Machine
//!
//! ```text
//! disconnected --(CONNECT_SOCKET)--> connecting
//! connecting   --(open)-----------> connected
//! connected    --(close)----------> disconnected
//! disconnected --(DISCONNECT_SOCKET)--> disconnected   (no-op)
//! ```
//!
//! No reconnection transition exists. Connection failures are logged, never
//! retried, never surfaced as typed errors.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::action::{Action, CONNECT_SOCKET, DISCONNECT_SOCKET};
use crate::config::RelayConfig;
use crate::pipeline::{Dispatch, Middleware};
use crate::transport::{Connection, ConnectionManager, TransportEvent};

// ============================================================================
// SocketLifecycle
// ============================================================================

/// Middleware owning connection establishment and teardown.
///
/// On [`CONNECT_SOCKET`]: spawns a task that opens the connection, enqueues
/// the token as the first payload, publishes the handle through the shared
/// [`ConnectionManager`], dispatches `SOCKET_CONNECTED`, and then consumes
/// the transport event channel until closure, whereupon it clears the
/// manager and dispatches `SOCKET_DISCONNECTED`.
///
/// On [`DISCONNECT_SOCKET`]: requests shutdown of the held connection, if
/// any; the closure event then drives the disconnected dispatch.
///
/// All actions, triggers included, pass down the pipeline unchanged.
///
/// Requires a tokio runtime: connection tasks are spawned onto the ambient
/// runtime of the dispatching thread.
pub struct SocketLifecycle {
    /// Shared slot both middleware components read.
    manager: Arc<ConnectionManager>,
    /// Endpoint to connect to.
    endpoint: String,
}

impl SocketLifecycle {
    /// Creates a lifecycle handler over a shared manager.
    #[must_use]
    pub fn new(config: &RelayConfig, manager: Arc<ConnectionManager>) -> Self {
        Self {
            manager,
            endpoint: config.endpoint().as_str().to_string(),
        }
    }

    /// Returns the shared connection manager.
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Handles a connect trigger.
    fn connect(&self, dispatch: &Dispatch, action: &Action) {
        let token = action.get_string("token");
        if token.is_empty() {
            warn!("Connect trigger without token field");
        }

        let manager = Arc::clone(&self.manager);
        let dispatch = dispatch.clone();
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            let (connection, mut events) = match Connection::open(&endpoint).await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(endpoint = %endpoint, error = %e, "Socket connect failed");
                    return;
                }
            };

            // Token first: enqueued before the handle is published, so no
            // forwarded action can precede it on the wire.
            if let Err(e) = connection.send_token(&token) {
                warn!(endpoint = %endpoint, error = %e, "Failed to enqueue token");
            }

            let id = connection.id();
            manager.set(connection);
            dispatch.call(Action::socket_connected(id, endpoint.as_str()));

            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::Closed => {
                        manager.clear_if(id);
                        dispatch.call(Action::socket_disconnected());
                        break;
                    }
                }
            }
        });
    }

    /// Handles a disconnect trigger.
    fn disconnect(&self) {
        match self.manager.current() {
            Some(connection) => {
                debug!(connection = %connection.id(), "Disconnect requested");
                connection.shutdown();
            }
            None => debug!("Disconnect trigger with no active connection"),
        }
    }
}

impl Middleware for SocketLifecycle {
    fn handle(&self, dispatch: &Dispatch, action: Action, next: &mut dyn FnMut(Action)) {
        match action.kind() {
            CONNECT_SOCKET => self.connect(dispatch, &action),
            DISCONNECT_SOCKET => self.disconnect(),
            _ => {}
        }

        next(action);
    }
}

// ============================================================================
// Tests
// ============================================================================
