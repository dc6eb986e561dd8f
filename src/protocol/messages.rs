// ABOUTME: Inbound frame definitions and decoding
// ABOUTME: Supports the "update" full-state snapshot; other kinds are surfaced as Unknown

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Discriminant of the full-state snapshot frame
pub const UPDATE: &str = "update";

/// One decoded inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Full table-state snapshot replacing the previously known state
    Update(StateUpdate),

    /// Any other discriminant; carried for logging only
    Unknown {
        /// Value of the `type` field
        kind: String,
    },
}

/// Payload of an `update` frame
///
/// Only `state` is required. The other fields are informational: a value of
/// the wrong shape is logged and treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateUpdate {
    /// Opaque table-state snapshot
    pub state: Value,
    /// Table the server says this snapshot belongs to; numbers are kept in string form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Value>,
}

/// Tag plus the remaining fields of the object
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    body: Map<String, Value>,
}

impl Frame {
    /// Decode a text payload into a frame
    pub fn decode(text: &str) -> Result<Self, Error> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| Error::DecodeFault(e.to_string()))?;

        match envelope.kind.as_str() {
            UPDATE => {
                StateUpdate::from_body(envelope.body).map(Frame::Update)
            }
            _ => Ok(Frame::Unknown {
                kind: envelope.kind,
            }),
        }
    }

    /// Value of the `type` discriminant
    pub fn kind(&self) -> &str {
        match self {
            Frame::Update(_) => UPDATE,
            Frame::Unknown { kind } => kind.as_str(),
        }
    }
}

impl StateUpdate {
    fn from_body(mut body: Map<String, Value>) -> Result<Self, Error> {
        let state = body.remove("state").ok_or_else(|| {
            Error::DecodeFault("update frame: missing field `state`".to_string())
        })?;

        let table_id = match body.remove("table_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            Some(other) => {
                log::warn!("Ignoring update table_id of unexpected shape: {}", other);
                None
            }
        };

        let seq = match body.remove("seq") {
            None | Some(Value::Null) => None,
            Some(seq) => {
                let parsed = seq.as_u64();
                if parsed.is_none() {
                    log::warn!("Ignoring update seq of unexpected shape: {}", seq);
                }
                parsed
            }
        };

        let events = match body.remove("events") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(events)) => events,
            Some(other) => {
                log::warn!("Ignoring update events of unexpected shape: {}", other);
                Vec::new()
            }
        };

        Ok(Self {
            state,
            table_id,
            seq,
            events,
        })
    }
}
