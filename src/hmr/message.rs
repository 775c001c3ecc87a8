//! Hot Reload Message Protocol
//!
//! JSON messages sent over WebSocket from the dev server to browser clients.
//!
//! # Message Types
//!
//! - `connected`: handshake, sent once per client
//! - `full-reload`: reload the page serving `path`

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HmrMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Full page reload for clients viewing `path`
    FullReload {
        /// Request path of the changed page (e.g. "/pages/about.html")
        path: String,
        /// Milliseconds since the Unix epoch when the change was seen
        timestamp: u64,
    },
}

impl HmrMessage {
    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create a full-reload message stamped with the current time
    pub fn full_reload(path: impl Into<String>) -> Self {
        Self::FullReload {
            path: path.into(),
            timestamp: now_millis(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"full-reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
