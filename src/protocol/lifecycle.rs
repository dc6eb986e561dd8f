// ABOUTME: Connection lifecycle state machine
// ABOUTME: Channel events are applied one at a time: connecting -> open -> closed, or connecting -> failed

/// Raw event reported by a channel, in delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake completed
    Opened,
    /// Text payload received
    Message(String),
    /// Channel-level error
    Error(String),
    /// Channel closed; nothing follows
    Closed,
}

/// Lifecycle state of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in flight
    Connecting,
    /// Ready to receive frames
    Open,
    /// Ended after having been open
    Closed,
    /// Never opened: error, close or timeout while connecting
    Failed,
}

impl ConnectionState {
    /// State after `event` is delivered
    pub fn on_event(self, event: &ChannelEvent) -> Self {
        use ChannelEvent as E;
        use ConnectionState as S;

        match (self, event) {
            (S::Connecting, E::Opened) => S::Open,
            (S::Connecting, E::Error(_) | E::Closed) => S::Failed,
            (S::Connecting, E::Message(_)) => S::Connecting,
            // Error while open collapses to closed; the error itself is surfaced separately
            (S::Open, E::Error(_) | E::Closed) => S::Closed,
            (S::Open, E::Opened | E::Message(_)) => S::Open,
            (terminal, _) => terminal,
        }
    }

    /// State after the setup window expires
    pub fn on_timeout(self) -> Self {
        match self {
            ConnectionState::Connecting => ConnectionState::Failed,
            other => other,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }

    /// Whether frames may be received
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }
}
