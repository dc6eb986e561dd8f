// ABOUTME: Frame dispatcher for open connections
// ABOUTME: Decodes each inbound message and routes snapshots to the state sink until close

use crate::error::Error;
use crate::protocol::lifecycle::{ChannelEvent, ConnectionState};
use crate::protocol::messages::{Frame, StateUpdate};
use crate::protocol::transport::Channel;
use crate::sync::{ConnectionInfo, StateSink};
use std::sync::Arc;
use tokio::sync::watch;

/// What a dispatcher did over a connection's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Snapshots written to the sink
    pub frames_applied: u64,
    /// Frames with an unrecognized kind, or received outside the open state
    pub frames_ignored: u64,
    /// Payloads that failed to decode and were dropped
    pub decode_faults: u64,
    /// Last error the channel reported after opening
    pub channel_error: Option<Error>,
}

/// Consumes the events of one open connection
///
/// Events are handled one at a time, each to completion, in delivery order.
pub struct FrameDispatcher<S: StateSink + ?Sized> {
    info: ConnectionInfo,
    sink: Arc<S>,
    state: watch::Sender<ConnectionState>,
    summary: DispatchSummary,
}

impl<S: StateSink + ?Sized> FrameDispatcher<S> {
    /// Dispatcher for a connection that has just opened
    pub fn new(info: ConnectionInfo, sink: Arc<S>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Open);
        Self {
            info,
            sink,
            state,
            summary: DispatchSummary::default(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver observing lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Counters so far
    pub fn summary(&self) -> &DispatchSummary {
        &self.summary
    }

    /// Apply one channel event
    pub fn handle(&mut self, event: ChannelEvent) {
        let current = self.state();
        let next = current.on_event(&event);

        match event {
            ChannelEvent::Message(text) if current.is_open() => self.handle_message(&text),
            ChannelEvent::Message(_) => {
                log::debug!(
                    "Ignoring message on {} connection to table {}",
                    state_name(current),
                    self.info.endpoint
                );
                self.summary.frames_ignored += 1;
            }
            ChannelEvent::Error(reason) => {
                log::warn!("Channel error on table {}: {}", self.info.endpoint, reason);
                self.summary.channel_error = Some(Error::ChannelError(reason));
                // The connection stops being open here, not at the close that follows
                if current.is_open() {
                    self.sink.release_connection(self.info.id);
                }
            }
            ChannelEvent::Closed => {
                log::info!("Disconnected from table {}", self.info.endpoint);
                if !self.sink.release_connection(self.info.id) {
                    log::debug!("Connection {} was no longer the active one", self.info.id);
                }
            }
            ChannelEvent::Opened => {
                log::debug!("Ignoring repeated open for table {}", self.info.endpoint);
            }
        }

        if next != current {
            self.state.send_replace(next);
        }
    }

    /// Handle events until the channel closes
    pub async fn run(mut self, mut channel: Channel) -> DispatchSummary {
        while let Some(event) = channel.next_event().await {
            let finished = event == ChannelEvent::Closed;
            self.handle(event);
            if finished {
                return self.summary;
            }
        }

        // Producer went away without reporting close
        self.handle(ChannelEvent::Closed);
        self.summary
    }

    fn handle_message(&mut self, text: &str) {
        let frame = match Frame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Dropping frame from table {}: {}", self.info.endpoint, e);
                self.summary.decode_faults += 1;
                return;
            }
        };

        match frame {
            Frame::Update(update) => self.apply_update(update),
            Frame::Unknown { kind } => {
                log::warn!(
                    "Ignoring frame of unknown type {:?} from table {}",
                    kind,
                    self.info.endpoint
                );
                self.summary.frames_ignored += 1;
            }
        }
    }

    fn apply_update(&mut self, update: StateUpdate) {
        if let Some(table_id) = update.table_id.as_deref() {
            if table_id != self.info.endpoint.as_str() {
                log::warn!(
                    "Update for table {} arrived on connection to table {}",
                    table_id,
                    self.info.endpoint
                );
            }
        }

        log::debug!(
            "Applying snapshot seq={:?} ({} events) to table {}",
            update.seq,
            update.events.len(),
            self.info.endpoint
        );

        self.sink.replace_table_state(update.state);
        self.summary.frames_applied += 1;
    }
}

fn state_name(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connecting => "connecting",
        ConnectionState::Open => "open",
        ConnectionState::Closed => "closed",
        ConnectionState::Failed => "failed",
    }
}
