//! Action types flowing through the dispatch pipeline.
//!
//! An [`Action`] is a tagged record identified by its `type` field, with an
//! arbitrary JSON payload flattened beside the tag:
//!
//! ```json
//! { "type": "CART_ADD", "sku": "A-1", "quantity": 2 }
//! ```
//!
//! # Action Types
//!
//! | Constant | Direction | Purpose |
//! |----------|-----------|---------|
//! | [`CONNECT_SOCKET`] | inbound trigger | open the connection, carries `token` |
//! | [`DISCONNECT_SOCKET`] | inbound trigger | close the connection |
//! | [`SOCKET_CONNECTED`] | dispatched by this crate | connection established |
//! | [`SOCKET_DISCONNECTED`] | dispatched by this crate | connection gone |
//! | [`SOCKET_AUTH_SUCCESS`] | declared only | constructor exists, never dispatched |
//! | [`SOCKET_AUTH_FAILED`] | declared only | constructor exists, never dispatched |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::transport::ConnectionId;

// ============================================================================
// Action Type Constants
// ============================================================================

/// Trigger: open a connection. Carries a `token` field.
pub const CONNECT_SOCKET: &str = "CONNECT_SOCKET";

/// Trigger: close the active connection, if any.
pub const DISCONNECT_SOCKET: &str = "DISCONNECT_SOCKET";

/// Lifecycle: a connection was established.
///
/// Carries `connectionId` and `endpoint`; the live handle is published
/// through [`ConnectionManager`](crate::transport::ConnectionManager).
pub const SOCKET_CONNECTED: &str = "SOCKET_CONNECTED";

/// Lifecycle: the connection closed (locally or remotely).
pub const SOCKET_DISCONNECTED: &str = "SOCKET_DISCONNECTED";

/// Lifecycle: authentication accepted by the remote peer.
///
/// Declared for consumers that wire their own handshake handling; no code
/// path in this crate dispatches it.
pub const SOCKET_AUTH_SUCCESS: &str = "SOCKET_AUTH_SUCCESS";

/// Lifecycle: authentication rejected by the remote peer.
///
/// Declared for consumers that wire their own handshake handling; no code
/// path in this crate dispatches it.
pub const SOCKET_AUTH_FAILED: &str = "SOCKET_AUTH_FAILED";

// ============================================================================
// Action
// ============================================================================

/// A tagged data record flowing through the pipeline.
///
/// # Format
///
/// Serializes with the tag under `"type"` and payload fields flattened:
///
/// ```json
/// { "type": "CART_ADD", "sku": "A-1" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type tag.
    #[serde(rename = "type")]
    kind: String,

    /// Payload fields, flattened beside the tag.
    #[serde(flatten)]
    payload: Map<String, Value>,
}

// ============================================================================
// Constructors
// ============================================================================

impl Action {
    /// Creates an action with the given type and an empty payload.
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// Adds a payload field, builder style.
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Creates a [`CONNECT_SOCKET`] trigger carrying the authentication token.
    #[inline]
    #[must_use]
    pub fn connect_socket(token: impl Into<String>) -> Self {
        Self::new(CONNECT_SOCKET).with_field("token", token.into())
    }

    /// Creates a [`DISCONNECT_SOCKET`] trigger.
    #[inline]
    #[must_use]
    pub fn disconnect_socket() -> Self {
        Self::new(DISCONNECT_SOCKET)
    }

    /// Creates a [`SOCKET_CONNECTED`] lifecycle action.
    #[inline]
    #[must_use]
    pub fn socket_connected(connection_id: ConnectionId, endpoint: impl Into<String>) -> Self {
        Self::new(SOCKET_CONNECTED)
            .with_field("connectionId", connection_id.to_string())
            .with_field("endpoint", endpoint.into())
    }

    /// Creates a [`SOCKET_DISCONNECTED`] lifecycle action.
    #[inline]
    #[must_use]
    pub fn socket_disconnected() -> Self {
        Self::new(SOCKET_DISCONNECTED)
    }

    /// Creates a [`SOCKET_AUTH_SUCCESS`] lifecycle action.
    #[inline]
    #[must_use]
    pub fn socket_auth_success() -> Self {
        Self::new(SOCKET_AUTH_SUCCESS)
    }

    /// Creates a [`SOCKET_AUTH_FAILED`] lifecycle action.
    #[inline]
    #[must_use]
    pub fn socket_auth_failed() -> Self {
        Self::new(SOCKET_AUTH_FAILED)
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Action {
    /// Returns the action type tag.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the payload fields.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Gets a string field from the payload.
    ///
    /// Returns empty string if the key is missing or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a boolean field from the payload.
    ///
    /// Returns `false` if the key is missing or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.payload
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }

    /// Gets a u64 field from the payload.
    ///
    /// Returns 0 if the key is missing or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.payload
            .get(key)
            .and_then(|v| v.as_u64())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let action = Action::new("CART_ADD").with_field("sku", "A-1");
        let json = serde_json::to_string(&action).expect("serialize");

        assert!(json.contains(r#""type":"CART_ADD""#));
        assert!(json.contains(r#""sku":"A-1""#));
    }

    #[test]
    fn test_action_deserialization() {
        let json_str = r#"{ "type": "CART_ADD", "sku": "A-1", "quantity": 2 }"#;
        let action: Action = serde_json::from_str(json_str).expect("parse action");

        assert_eq!(action.kind(), "CART_ADD");
        assert_eq!(action.get_string("sku"), "A-1");
        assert_eq!(action.get_u64("quantity"), 2);
    }

    #[test]
    fn test_connect_socket_carries_token() {
        let action = Action::connect_socket("secret");

        assert_eq!(action.kind(), CONNECT_SOCKET);
        assert_eq!(action.get_string("token"), "secret");
    }

    #[test]
    fn test_disconnect_socket_has_no_payload() {
        let action = Action::disconnect_socket();

        assert_eq!(action.kind(), DISCONNECT_SOCKET);
        assert!(action.payload().is_empty());
    }

    #[test]
    fn test_socket_connected_payload() {
        let id = ConnectionId::generate();
        let action = Action::socket_connected(id, "ws://localhost:5000");

        assert_eq!(action.kind(), SOCKET_CONNECTED);
        assert_eq!(action.get_string("connectionId"), id.to_string());
        assert_eq!(action.get_string("endpoint"), "ws://localhost:5000");
    }

    #[test]
    fn test_auth_constructors_are_bare() {
        assert_eq!(Action::socket_auth_success().kind(), SOCKET_AUTH_SUCCESS);
        assert_eq!(Action::socket_auth_failed().kind(), SOCKET_AUTH_FAILED);
    }

    #[test]
    fn test_get_helpers_default_on_missing() {
        let action = Action::new("EMPTY");

        assert_eq!(action.get_string("missing"), "");
        assert!(!action.get_bool("missing"));
        assert_eq!(action.get_u64("missing"), 0);
    }
}
