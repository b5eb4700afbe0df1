//! Action forwarding filter.
//!
//! Evaluates the configured [`Criteria`] against every action; when a live
//! connection exists and the criterion matches, emits the action under the
//! configured event name, then passes it onward unchanged. In every other
//! case the filter is the identity.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{trace, warn};

use crate::action::Action;
use crate::criteria::Criteria;
use crate::pipeline::{Dispatch, Middleware};
use crate::transport::ConnectionManager;

// ============================================================================
// SocketRelay
// ============================================================================

/// Middleware forwarding matching actions over the live connection.
///
/// Forwarding is fire-and-forget: emit failures are logged and the action
/// continues down the pipeline regardless. No transformation, no batching,
/// no buffering while disconnected.
pub struct SocketRelay {
    /// Shared slot the lifecycle handler publishes connections into.
    manager: Arc<ConnectionManager>,
    /// Rule selecting which actions are forwarded.
    criteria: Criteria,
    /// Channel/topic label forwarded actions are wrapped under.
    event_name: String,
}

impl SocketRelay {
    /// Creates a forwarding filter over a shared manager.
    #[must_use]
    pub fn new(
        manager: Arc<ConnectionManager>,
        criteria: Criteria,
        event_name: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            criteria,
            event_name: event_name.into(),
        }
    }

    /// Returns the shared connection manager.
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Returns the configured event name.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

impl Middleware for SocketRelay {
    fn handle(&self, _dispatch: &Dispatch, action: Action, next: &mut dyn FnMut(Action)) {
        if let Some(connection) = self.manager.current()
            && self.criteria.matches(&action)
        {
            trace!(
                kind = action.kind(),
                event = %self.event_name,
                connection = %connection.id(),
                "Forwarding action"
            );

            if let Err(e) = connection.emit(&self.event_name, &action) {
                warn!(kind = action.kind(), error = %e, "Failed to forward action");
            }
        }

        next(action);
    }
}

// ============================================================================
// Tests
// ============================================================================
