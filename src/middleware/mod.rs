//! Pipeline middleware components.
//!
//! Two cooperating pieces sharing one [`ConnectionManager`]:
//!
//! | Component | Reacts to |
//! |-----------|-----------|
//! | [`SocketLifecycle`] | `CONNECT_SOCKET` / `DISCONNECT_SOCKET` triggers, transport closure |
//! | [`SocketRelay`] | actions matching the configured [`Criteria`] while connected |
//!
//! Every dispatched action reaches the lifecycle handler first, then the
//! forwarding filter; both pass every action onward. [`relay_pair`] wires
//! both over a fresh shared manager in that order.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::criteria::Criteria;
use crate::transport::ConnectionManager;

// ============================================================================
// Submodules
// ============================================================================

/// Connection lifecycle handler.
pub mod lifecycle;

/// Action forwarding filter.
pub mod relay;

// ============================================================================
// Re-exports
// ============================================================================

pub use lifecycle::SocketLifecycle;
pub use relay::SocketRelay;

// ============================================================================
// Construction
// ============================================================================

/// Builds both middleware components over one shared connection manager.
///
/// Install them in the returned order: lifecycle first, then the relay.
///
/// # Example
///
/// ```
/// use socket_relay::{Criteria, Pipeline, RelayConfig, relay_pair};
///
/// let (lifecycle, relay) = relay_pair(&RelayConfig::new(), Criteria::prefix("CART_"));
///
/// let pipeline = Pipeline::builder().with(lifecycle).with(relay).build();
/// ```
#[must_use]
pub fn relay_pair(config: &RelayConfig, criteria: Criteria) -> (SocketLifecycle, SocketRelay) {
    let manager = Arc::new(ConnectionManager::new());

    let lifecycle = SocketLifecycle::new(config, Arc::clone(&manager));
    let relay = SocketRelay::new(manager, criteria, config.event_name());

    (lifecycle, relay)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_pair_shares_one_manager() {
        let config = RelayConfig::new().with_event_name("sync");
        let (lifecycle, relay) = relay_pair(&config, Criteria::default());

        assert!(Arc::ptr_eq(lifecycle.manager(), relay.manager()));
        assert_eq!(relay.event_name(), "sync");
    }
}
