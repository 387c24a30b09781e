//! Message channel
//!
//! Pages talk to the worker with small JSON messages:
//!
//! - `{"type":"GET_VERSION"}` is answered on the first transferred port
//!   with `{"version":"<version>"}`.
//! - `{"type":"SKIP_WAITING"}` asks a waiting worker to activate now.
//!
//! Anything else is ignored.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::host::MessagePortId;

/// Inbound message event
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Raw payload
    data: Vec<u8>,
    /// Origin of the sender
    origin: String,
    /// Ports transferred with the message
    ports: Vec<MessagePortId>,
}

impl MessageEvent {
    /// Create new message event
    pub fn new(data: impl Into<Vec<u8>>, origin: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            origin: origin.into(),
            ports: Vec::new(),
        }
    }

    /// Attach a reply port
    pub fn with_port(mut self, port: MessagePortId) -> Self {
        self.ports.push(port);
        self
    }

    /// Get data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get origin
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Get ports
    pub fn ports(&self) -> &[MessagePortId] {
        &self.ports
    }

    /// Decode the payload into a command, if it is one
    pub fn command(&self) -> Option<WorkerMessage> {
        serde_json::from_slice(&self.data).ok()
    }
}

/// Commands understood by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    SkipWaiting,
    GetVersion,
}

/// Reply to `GET_VERSION`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub version: String,
}

impl VersionReply {
    /// Serialized reply payload
    pub fn to_bytes(&self) -> Vec<u8> {
        // A struct with one string field cannot fail to serialize
        serde_json::to_vec(self).unwrap_or_default()
    }
}
