// ABOUTME: Shared state for tablesync
// ABOUTME: Slots for user, current table, table snapshot and the active connection

/// Slot storage and the StateSink seam
pub mod store;

pub use store::{ConnectionInfo, SharedState, Slot, StateSink, UserIdentity};
