//! Relay configuration.
//!
//! Supplies the two construction-time knobs of the relay: the endpoint the
//! lifecycle handler connects to, and the event name forwarded actions are
//! emitted under.
//!
//! # Example
//!
//! ```
//! use socket_relay::RelayConfig;
//!
//! # fn example() -> socket_relay::Result<()> {
//! let config = RelayConfig::new()
//!     .with_endpoint("ws://localhost:9001")?
//!     .with_event_name("sync");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::env;

use tracing::warn;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default endpoint when none is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:5000";

/// Default event name for forwarded actions.
pub const DEFAULT_EVENT_NAME: &str = "data";

/// Environment variable overriding the default endpoint.
pub const ENDPOINT_ENV_VAR: &str = "SOCKET_API_URL";

// ============================================================================
// RelayConfig
// ============================================================================

/// Construction-time configuration for the relay components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// WebSocket endpoint of the remote peer.
    endpoint: Url,

    /// Channel/topic label forwarded actions are wrapped under.
    event_name: String,
}

// ============================================================================
// Constructors
// ============================================================================

impl RelayConfig {
    /// Creates a configuration with the default endpoint and event name.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is valid"),
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }

    /// Creates a configuration honoring the `SOCKET_API_URL` environment
    /// variable.
    ///
    /// An unset variable yields the default endpoint; an invalid value is
    /// logged and ignored rather than surfaced.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::new();

        match env::var(ENDPOINT_ENV_VAR) {
            Ok(value) => match config.clone().with_endpoint(&value) {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        var = ENDPOINT_ENV_VAR,
                        value = %value,
                        error = %e,
                        "Ignoring invalid endpoint override"
                    );
                    config
                }
            },
            Err(_) => config,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RelayConfig {
    /// Sets the endpoint, validating the URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the value is not a valid `ws`/`wss` URL.
    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint.as_ref())?;
        Ok(self)
    }

    /// Sets the event name forwarded actions are emitted under.
    #[inline]
    #[must_use]
    pub fn with_event_name(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = event_name.into();
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl RelayConfig {
    /// Returns the configured endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the configured event name.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Parses and validates a WebSocket endpoint URL.
fn parse_endpoint(value: &str) -> Result<Url> {
    let url =
        Url::parse(value).map_err(|e| Error::config(format!("Invalid endpoint URL: {e}")))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(Error::config(format!(
            "Unsupported endpoint scheme '{other}': expected ws or wss"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::new();

        // Url normalizes the empty path to "/"
        assert_eq!(config.endpoint().as_str(), "ws://localhost:5000/");
        assert_eq!(config.event_name(), "data");
    }

    #[test]
    fn test_with_endpoint() {
        let config = RelayConfig::new()
            .with_endpoint("wss://example.com/socket")
            .expect("valid endpoint");

        assert_eq!(config.endpoint().as_str(), "wss://example.com/socket");
    }

    #[test]
    fn test_with_event_name() {
        let config = RelayConfig::new().with_event_name("sync");
        assert_eq!(config.event_name(), "sync");
    }

    #[test]
    fn test_rejects_non_websocket_scheme() {
        let result = RelayConfig::new().with_endpoint("http://example.com");

        let err = result.unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rejects_unparseable_endpoint() {
        let result = RelayConfig::new().with_endpoint("not a url");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_env_without_var_uses_default() {
        // Env var handling is covered indirectly: an absent variable must
        // leave the default untouched. Setting process-wide env in tests
        // races other tests, so only the absent case is exercised here.
        if env::var(ENDPOINT_ENV_VAR).is_err() {
            let config = RelayConfig::from_env();
            assert_eq!(config, RelayConfig::new());
        }
    }
}
