//! socket-relay - WebSocket relay middleware for action pipelines.
//!
//! This library sits inside a unidirectional-data-flow application's action
//! pipeline and selectively forwards actions over a persistent WebSocket
//! connection to a remote peer, while surfacing connection lifecycle
//! transitions back into the same pipeline as actions.
//!
//! # Architecture
//!
//! Two cooperating middleware components share one connection slot:
//!
//! - **[`SocketLifecycle`]**: reacts to `CONNECT_SOCKET` / `DISCONNECT_SOCKET`
//!   trigger actions, opens and closes the connection, transmits the
//!   authentication token as the first payload, and dispatches
//!   `SOCKET_CONNECTED` / `SOCKET_DISCONNECTED` back into the pipeline.
//! - **[`SocketRelay`]**: evaluates a [`Criteria`] against every action and,
//!   while a connection is live, emits matching actions under a configurable
//!   event name before passing them onward unchanged.
//!
//! Deliberately out of scope: reconnection, retry, buffering while
//! disconnected, acknowledgements, and backpressure. The store and the
//! remote peer are external collaborators.
//!
//! # Quick Start
//!
//! ```no_run
//! use socket_relay::{Action, Criteria, Pipeline, RelayConfig, relay_pair};
//!
//! #[tokio::main]
//! async fn main() -> socket_relay::Result<()> {
//!     let config = RelayConfig::from_env().with_event_name("data");
//!     let (lifecycle, relay) = relay_pair(&config, Criteria::prefix("CART_"));
//!
//!     let pipeline = Pipeline::builder()
//!         .with(lifecycle)
//!         .with(relay)
//!         .sink(|action| println!("reduced: {}", action.kind()))
//!         .build();
//!
//!     // Open the connection; the token rides in the trigger action
//!     pipeline.dispatch(Action::connect_socket("secret-token"));
//!
//!     // Matching actions are forwarded, everything passes through
//!     pipeline.dispatch(Action::new("CART_ADD").with_field("sku", "A-1"));
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`action`] | [`Action`] record and lifecycle action constructors |
//! | [`config`] | [`RelayConfig`] endpoint and event-name settings |
//! | [`criteria`] | [`Criteria`] match rules (predicate, prefix, prefix set) |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`middleware`] | [`SocketLifecycle`] and [`SocketRelay`] components |
//! | [`pipeline`] | [`Pipeline`] dispatch seam and [`Middleware`] trait |
//! | [`protocol`] | Wire message types (internal) |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Action types flowing through the dispatch pipeline.
pub mod action;

/// Relay configuration.
pub mod config;

/// Match criteria selecting which actions are forwarded.
pub mod criteria;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Pipeline middleware components.
pub mod middleware;

/// Action dispatch pipeline.
pub mod pipeline;

/// Wire message types.
///
/// Internal module defining the forwarded-action envelope.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module handling the connection event loop and the shared
/// connection slot.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Action types
pub use action::{
    Action, CONNECT_SOCKET, DISCONNECT_SOCKET, SOCKET_AUTH_FAILED, SOCKET_AUTH_SUCCESS,
    SOCKET_CONNECTED, SOCKET_DISCONNECTED,
};

// Configuration
pub use config::{DEFAULT_ENDPOINT, DEFAULT_EVENT_NAME, ENDPOINT_ENV_VAR, RelayConfig};

// Criteria
pub use criteria::Criteria;

// Error types
pub use error::{Error, Result};

// Middleware components
pub use middleware::{SocketLifecycle, SocketRelay, relay_pair};

// Pipeline types
pub use pipeline::{Dispatch, Middleware, Pipeline, PipelineBuilder, middleware_fn};

// Transport types
pub use transport::{Connection, ConnectionId, ConnectionManager, TransportEvent};
