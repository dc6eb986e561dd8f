// ABOUTME: Connection establishment for the table-state protocol
// ABOUTME: Races open vs error vs timeout, then hands the open channel to a FrameDispatcher

use crate::config::ClientConfig;
use crate::error::Error;
use crate::protocol::dispatcher::{DispatchSummary, FrameDispatcher};
use crate::protocol::endpoint::Endpoint;
use crate::protocol::lifecycle::{ChannelEvent, ConnectionState};
use crate::protocol::transport::{Channel, Transport, WsTransport};
use crate::sync::{ConnectionInfo, SharedState, StateSink};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Client that connects to tables and keeps a state sink current
pub struct StateClient<S: StateSink + ?Sized = SharedState, T: Transport = WsTransport> {
    config: ClientConfig,
    sink: Arc<S>,
    transport: T,
}

impl<S: StateSink + ?Sized> StateClient<S, WsTransport> {
    /// Client over real WebSockets
    pub fn new(config: ClientConfig, sink: Arc<S>) -> Result<Self, Error> {
        Self::with_transport(config, sink, WsTransport::new())
    }
}

impl<S: StateSink + ?Sized, T: Transport> StateClient<S, T> {
    /// Client over a custom transport
    pub fn with_transport(config: ClientConfig, sink: Arc<S>, transport: T) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            sink,
            transport,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sink that receives connection and snapshot updates
    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Open a connection to `endpoint`
    ///
    /// Resolves exactly once, on whichever comes first:
    /// - the channel opens: the connection is published to the sink and
    ///   handed to a spawned [`FrameDispatcher`];
    /// - the channel errors or closes: [`Error::ConnectionFailed`];
    /// - the connect timeout expires: the channel is torn down and
    ///   [`Error::ConnectionTimeout`] is returned.
    ///
    /// Events arriving after a failure are only logged.
    pub async fn establish(&self, endpoint: &Endpoint) -> Result<Connection, Error> {
        let url = endpoint.url(self.config.base_url());
        let timeout = self.config.connect_timeout();
        let id = Uuid::new_v4();

        log::debug!("Connecting to {} (connection {})", url, id);

        let mut channel = self.transport.open(&url);
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let mut state = ConnectionState::Connecting;
        let outcome = loop {
            tokio::select! {
                // An event that is already queued wins over a simultaneous expiry
                biased;

                event = channel.next_event() => {
                    let event = event.unwrap_or(ChannelEvent::Closed);
                    state = state.on_event(&event);

                    match (state, event) {
                        (ConnectionState::Open, _) => break Ok(()),
                        (ConnectionState::Failed, ChannelEvent::Error(reason)) => {
                            break Err(Error::ConnectionFailed(reason));
                        }
                        (ConnectionState::Failed, _) => {
                            break Err(Error::ConnectionFailed(
                                "channel closed before opening".to_string(),
                            ));
                        }
                        (_, ChannelEvent::Message(_)) => {
                            log::warn!("Ignoring message received before {} opened", url);
                        }
                        _ => {}
                    }
                }
                () = &mut deadline => {
                    state = state.on_timeout();
                    channel.teardown();
                    break Err(Error::ConnectionTimeout(timeout));
                }
            }
        };

        if let Err(e) = outcome {
            log::warn!("Connection to table {} ended {:?}: {}", endpoint, state, e);
            drain_late_events(channel, url);
            return Err(e);
        }

        let info = ConnectionInfo {
            id,
            endpoint: endpoint.clone(),
            url,
        };

        self.sink.publish_connection(info.clone());
        log::info!("Connected to table {}", endpoint);

        let dispatcher = FrameDispatcher::new(info.clone(), Arc::clone(&self.sink));
        let state = dispatcher.subscribe_state();
        let task = tokio::spawn(dispatcher.run(channel));

        Ok(Connection { info, state, task })
    }
}

/// Log whatever an abandoned channel still reports
fn drain_late_events(mut channel: Channel, url: String) {
    tokio::spawn(async move {
        while let Some(event) = channel.next_event().await {
            log::debug!("Late event from abandoned connection to {}: {:?}", url, event);
        }
    });
}

/// Handle to an open connection whose frames are being dispatched
#[derive(Debug)]
pub struct Connection {
    info: ConnectionInfo,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<DispatchSummary>,
}

impl Connection {
    /// Reference published to the connection slot
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Unique id of this connection
    pub fn id(&self) -> Uuid {
        self.info.id
    }

    /// Table this connection belongs to
    pub fn endpoint(&self) -> &Endpoint {
        &self.info.endpoint
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver observing lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Wait for the channel to close and report what was dispatched
    pub async fn closed(self) -> DispatchSummary {
        match self.task.await {
            Ok(summary) => summary,
            Err(e) => DispatchSummary {
                channel_error: Some(Error::ChannelError(format!("dispatcher stopped: {}", e))),
                ..DispatchSummary::default()
            },
        }
    }
}
