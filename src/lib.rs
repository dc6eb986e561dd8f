// ABOUTME: Main library entry point for tablesync
// ABOUTME: Exports public API for the table-state synchronization client

//! # tablesync
//!
//! Minimal real-time state-synchronization client for a remote table-state server.
//!
//! A [`StateClient`] opens one WebSocket per table, races the handshake against a
//! bounded timeout, and hands the open connection to a [`FrameDispatcher`] that
//! republishes every authoritative snapshot into a [`SharedState`] sink.

#![warn(missing_docs)]

/// Client configuration
pub mod config;
/// Protocol implementation for WebSocket communication
pub mod protocol;
/// Shared state slots consumed by the rest of the application
pub mod sync;

pub use config::ClientConfig;
pub use protocol::client::{Connection, StateClient};
pub use protocol::dispatcher::{DispatchSummary, FrameDispatcher};
pub use protocol::endpoint::Endpoint;
pub use protocol::lifecycle::{ChannelEvent, ConnectionState};
pub use protocol::transport::{Channel, Transport, WsTransport};
pub use sync::{ConnectionInfo, SharedState, StateSink};

/// Result type for tablesync operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for tablesync
pub mod error {
    use std::time::Duration;
    use thiserror::Error;

    /// Error types for tablesync operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        /// Neither open nor error was reported within the setup window
        #[error("Connection timeout after {0:?}")]
        ConnectionTimeout(Duration),

        /// Channel reported an error (or closed) before it opened
        #[error("Connection failed: {0}")]
        ConnectionFailed(String),

        /// Channel reported an error after it opened
        #[error("Channel error: {0}")]
        ChannelError(String),

        /// Inbound payload could not be decoded
        #[error("Decode fault: {0}")]
        DecodeFault(String),

        /// Endpoint identifier is unusable
        #[error("Invalid endpoint: {0}")]
        InvalidEndpoint(String),

        /// Client configuration is unusable
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),
    }
}
