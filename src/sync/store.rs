// ABOUTME: Shared state slots published to the rest of the application
// ABOUTME: Latest-value-only slots on tokio watch channels, plus the StateSink seam used by the core

use crate::protocol::endpoint::Endpoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

/// Reference to an open connection, as held by the connection slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Unique per establishment attempt
    pub id: Uuid,
    /// Table the connection belongs to
    pub endpoint: Endpoint,
    /// Resolved WebSocket URL
    pub url: String,
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    pub chips: u64,
}

/// Single latest-value slot; every write is broadcast to subscribers
#[derive(Debug)]
pub struct Slot<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> Slot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Current value
    pub fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// Whether the slot holds a value
    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Overwrite the value
    pub fn set(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Empty the slot
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Empty the slot only if its value matches; returns whether it was cleared
    pub fn clear_if(&self, matches: impl FnOnce(&T) -> bool) -> bool {
        self.tx.send_if_modified(|slot| match slot {
            Some(value) if matches(value) => {
                *slot = None;
                true
            }
            _ => false,
        })
    }

    /// Receiver observing every subsequent write
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write side of the shared state, as seen by the connection core
pub trait StateSink: Send + Sync + 'static {
    /// Record `info` as the active connection
    fn publish_connection(&self, info: ConnectionInfo);

    /// Forget connection `id` if it is still the active one
    fn release_connection(&self, id: Uuid) -> bool;

    /// Replace the table state wholesale
    fn replace_table_state(&self, snapshot: Value);
}

/// Application-wide shared state
#[derive(Debug, Default)]
pub struct SharedState {
    /// Signed-in user
    pub user: Slot<UserIdentity>,
    /// Table the user is looking at
    pub current_table: Slot<Endpoint>,
    /// Last authoritative table snapshot
    pub table_state: Slot<Value>,
    /// Active connection; set iff that connection is open
    pub connection: Slot<ConnectionInfo>,
}

impl SharedState {
    /// Create empty shared state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.connection.is_set()
    }
}

impl StateSink for SharedState {
    fn publish_connection(&self, info: ConnectionInfo) {
        self.connection.set(info);
    }

    fn release_connection(&self, id: Uuid) -> bool {
        self.connection.clear_if(|active| active.id == id)
    }

    fn replace_table_state(&self, snapshot: Value) {
        self.table_state.set(snapshot);
    }
}
