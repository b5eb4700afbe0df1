//! Connection slot shared by the middleware components.
//!
//! Holds at most one live [`Connection`] handle. Replaces a hidden
//! process-wide mutable reference with an explicitly owned object passed by
//! `Arc` into both the lifecycle handler and the forwarding filter.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use tracing::debug;

use super::connection::{Connection, ConnectionId};

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owner of the single live connection reference.
///
/// `set` on an occupied slot replaces the held handle and shuts the
/// displaced connection down so its event loop does not linger.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// The slot. At most one live connection at a time.
    slot: Mutex<Option<Connection>>,
}

impl ConnectionManager {
    /// Creates an empty manager.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the current connection handle, if any.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Connection> {
        self.slot.lock().clone()
    }

    /// Returns `true` if a connection is held.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Publishes a connection, displacing and shutting down any previous one.
    pub fn set(&self, connection: Connection) {
        let previous = self.slot.lock().replace(connection);

        if let Some(previous) = previous {
            debug!(connection = %previous.id(), "Displaced connection shut down");
            previous.shutdown();
        }
    }

    /// Clears the slot unconditionally, returning the held handle.
    pub fn clear(&self) -> Option<Connection> {
        self.slot.lock().take()
    }

    /// Clears the slot only if it holds the connection with the given id.
    ///
    /// Used when a stale connection's closure races a newer `set`; the
    /// newer connection stays published.
    pub fn clear_if(&self, id: ConnectionId) -> bool {
        let mut slot = self.slot.lock();

        match slot.as_ref() {
            Some(current) if current.id() == id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    /// Opens a connection against a throwaway loopback server.
    async fn open_test_connection() -> Connection {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let endpoint = format!("ws://{}", listener.local_addr().expect("local addr"));

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");
            // Hold the server side open
            std::future::pending::<()>().await;
            drop(ws);
        });

        let (connection, _events) = Connection::open(&endpoint).await.expect("open");
        connection
    }

    #[test]
    fn test_empty_manager() {
        let manager = ConnectionManager::new();

        assert!(manager.current().is_none());
        assert!(!manager.is_connected());
        assert!(manager.clear().is_none());
    }

    #[tokio::test]
    async fn test_set_and_current() {
        let manager = ConnectionManager::new();
        let connection = open_test_connection().await;
        let id = connection.id();

        manager.set(connection);

        assert!(manager.is_connected());
        assert_eq!(manager.current().expect("held").id(), id);
    }

    #[tokio::test]
    async fn test_clear_returns_handle() {
        let manager = ConnectionManager::new();
        let connection = open_test_connection().await;
        let id = connection.id();
        manager.set(connection);

        let cleared = manager.clear().expect("held");

        assert_eq!(cleared.id(), id);
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn test_clear_if_ignores_other_ids() {
        let manager = ConnectionManager::new();
        let connection = open_test_connection().await;
        let id = connection.id();
        manager.set(connection);

        assert!(!manager.clear_if(ConnectionId::generate()));
        assert!(manager.is_connected());

        assert!(manager.clear_if(id));
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn test_set_displaces_previous() {
        let manager = ConnectionManager::new();
        let first = open_test_connection().await;
        let second = open_test_connection().await;
        let second_id = second.id();

        manager.set(first);
        manager.set(second);

        assert_eq!(manager.current().expect("held").id(), second_id);
    }
}
