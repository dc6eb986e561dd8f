// ABOUTME: Protocol implementation for the table-state WebSocket protocol
// ABOUTME: Frame decoding, connection lifecycle, establishment and dispatch

/// Connection establishment and the connection handle
pub mod client;
/// Inbound frame routing for open connections
pub mod dispatcher;
/// Endpoint identifiers and URL derivation
pub mod endpoint;
/// Connection lifecycle state machine
pub mod lifecycle;
/// Inbound frame definitions and decoding
pub mod messages;
/// Channel transport abstraction and WebSocket implementation
pub mod transport;

pub use messages::Frame;
