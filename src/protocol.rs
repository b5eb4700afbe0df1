//! Wire message types.
//!
//! Defines the message format for traffic between the relay and the remote
//! peer. The wire contract is deliberately thin:
//!
//! | Message | Direction | Format |
//! |---------|-----------|--------|
//! | token | local → remote | raw token text, first payload after open |
//! | envelope | local → remote | `{ "event": <name>, "action": <action> }` |
//!
//! Inbound traffic is logged and otherwise ignored; there is no response
//! correlation and no framing beyond the transport's own.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::action::Action;

// ============================================================================
// Envelope
// ============================================================================

/// A forwarded action wrapped under its configured event name.
///
/// # Format
///
/// ```json
/// {
///   "event": "data",
///   "action": { "type": "CART_ADD", "sku": "A-1" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Channel/topic label the action is emitted under.
    pub event: String,

    /// The forwarded action, verbatim.
    pub action: Action,
}

impl Envelope {
    /// Creates an envelope wrapping an action under an event name.
    #[inline]
    #[must_use]
    pub fn new(event: impl Into<String>, action: Action) -> Self {
        Self {
            event: event.into(),
            action,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope::new("data", Action::new("CART_ADD").with_field("sku", "A-1"));
        let json = serde_json::to_string(&envelope).expect("serialize");

        assert!(json.contains(r#""event":"data""#));
        assert!(json.contains(r#""type":"CART_ADD""#));
        assert!(json.contains(r#""sku":"A-1""#));
    }

    #[test]
    fn test_envelope_carries_action_verbatim() {
        let action = Action::new("B_X").with_field("n", 7);
        let envelope = Envelope::new("sync", action.clone());

        assert_eq!(envelope.action, action);
        assert_eq!(envelope.event, "sync");
    }
}
