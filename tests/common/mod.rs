// ABOUTME: Scripted in-memory transport for driving channel events in tests
// ABOUTME: Each open attempt replays a queued script and exposes a remote handle

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tablesync::{Channel, ChannelEvent, Transport};
use tokio::sync::mpsc;

/// Server side of one scripted channel
#[derive(Clone)]
pub struct Remote {
    pub url: String,
    tx: mpsc::UnboundedSender<ChannelEvent>,
    torn_down: Arc<AtomicBool>,
}

impl Remote {
    pub fn open(&self) {
        let _ = self.tx.send(ChannelEvent::Opened);
    }

    pub fn message(&self, text: impl Into<String>) {
        let _ = self.tx.send(ChannelEvent::Message(text.into()));
    }

    pub fn update(&self, state: Value) {
        self.message(update_frame(state));
    }

    pub fn error(&self, reason: &str) {
        let _ = self.tx.send(ChannelEvent::Error(reason.to_string()));
    }

    pub fn close(&self) {
        let _ = self.tx.send(ChannelEvent::Closed);
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Inner {
    scripts: VecDeque<Vec<ChannelEvent>>,
    remotes: Vec<Remote>,
}

/// Transport whose channels are fed by the test
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered immediately by the next open attempt
    pub fn script(&self, events: Vec<ChannelEvent>) -> &Self {
        self.inner.lock().unwrap().scripts.push_back(events);
        self
    }

    /// Remote of the `n`th open attempt
    pub fn remote(&self, n: usize) -> Remote {
        self.inner.lock().unwrap().remotes[n].clone()
    }

    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().remotes.len()
    }
}

impl Transport for ScriptedTransport {
    fn open(&self, url: &str) -> Channel {
        let (tx, rx) = mpsc::unbounded_channel();
        let torn_down = Arc::new(AtomicBool::new(false));

        let mut inner = self.inner.lock().unwrap();
        for event in inner.scripts.pop_front().unwrap_or_default() {
            tx.send(event).unwrap();
        }
        inner.remotes.push(Remote {
            url: url.to_string(),
            tx,
            torn_down: Arc::clone(&torn_down),
        });

        Channel::new(rx, move || torn_down.store(true, Ordering::SeqCst))
    }
}

pub fn update_frame(state: Value) -> String {
    json!({ "type": "update", "state": state }).to_string()
}

pub fn update_event(state: Value) -> ChannelEvent {
    ChannelEvent::Message(update_frame(state))
}
