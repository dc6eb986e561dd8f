// ABOUTME: Transport abstraction delivering channel events in order
// ABOUTME: WsTransport pumps a tokio-tungstenite WebSocket into an event queue

use crate::protocol::lifecycle::ChannelEvent;
use futures_util::StreamExt;
use std::fmt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

/// Opens duplex channels to a URL
pub trait Transport: Send + Sync + 'static {
    /// Start opening a channel to `url`
    ///
    /// Must not block: the outcome of the handshake arrives later as a
    /// [`ChannelEvent`] on the returned channel.
    fn open(&self, url: &str) -> Channel;
}

/// Event source of one in-flight or open channel
pub struct Channel {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Channel {
    /// Wrap an event queue and the action that tears the channel down
    pub fn new(
        events: mpsc::UnboundedReceiver<ChannelEvent>,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Next event, or `None` once the producer is gone
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Best-effort close of the underlying channel; later calls do nothing
    pub fn teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("torn_down", &self.teardown.is_none())
            .finish_non_exhaustive()
    }
}

/// WebSocket transport over tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

impl WsTransport {
    /// Create a WebSocket transport
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WsTransport {
    fn open(&self, url: &str) -> Channel {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(pump(url.to_string(), tx));
        Channel::new(rx, move || task.abort())
    }
}

/// Connect, then forward every inbound frame until the socket ends
///
/// Always finishes with `Closed` unless the receiver went away first.
async fn pump(url: String, tx: mpsc::UnboundedSender<ChannelEvent>) {
    let mut ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            let _ = tx.send(ChannelEvent::Error(e.to_string()));
            let _ = tx.send(ChannelEvent::Closed);
            return;
        }
    };

    if tx.send(ChannelEvent::Opened).is_err() {
        return;
    }

    while let Some(msg) = ws_stream.next().await {
        let event = match msg {
            Ok(WsMessage::Text(text)) => ChannelEvent::Message(text),
            Ok(WsMessage::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => ChannelEvent::Message(text),
                Err(_) => {
                    log::warn!("Dropping non-UTF-8 binary frame from {}", url);
                    continue;
                }
            },
            Ok(WsMessage::Close(frame)) => {
                log::debug!("Close frame from {}: {:?}", url, frame);
                break;
            }
            // Ping/pong and raw frames are handled by tungstenite
            Ok(_) => continue,
            Err(e) => {
                let _ = tx.send(ChannelEvent::Error(e.to_string()));
                break;
            }
        };

        if tx.send(event).is_err() {
            return;
        }
    }

    let _ = tx.send(ChannelEvent::Closed);
}
