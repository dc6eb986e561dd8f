// ABOUTME: Endpoint identifier naming a remote table
// ABOUTME: Derives the per-table WebSocket URL from the configured base

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key naming which remote table to connect to
///
/// Only emptiness is checked here; whether the table exists is the server's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from a non-empty identifier
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidEndpoint(
                "endpoint identifier is empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of this table under `base`: `<base>/<id>`
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.0)
    }
}

impl From<u64> for Endpoint {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
