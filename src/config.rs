// ABOUTME: Client configuration for tablesync
// ABOUTME: Base WebSocket endpoint and connection setup window

use crate::error::Error;
use std::time::Duration;

/// Base WebSocket endpoint tables are reached under
pub const DEFAULT_BASE_URL: &str = "ws://localhost:8000/ws";

/// Setup window for a single establishment attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Configuration shared by every establishment attempt of a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default endpoint and timeout
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Replace the base WebSocket endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the connection setup window
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Base WebSocket endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Connection setup window
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Check that the configuration can be used to connect
    pub fn validate(&self) -> Result<(), Error> {
        if self.connect_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "connect timeout must be non-zero".to_string(),
            ));
        }

        if !(self.base_url.starts_with("ws://") || self.base_url.starts_with("wss://")) {
            return Err(Error::InvalidConfig(format!(
                "base url must use ws:// or wss://, got {}",
                self.base_url
            )));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
