//! Request payloads shared by every transport.

use serde::{Deserialize, Serialize};

/// A single log entry to be recorded downstream.
///
/// There is no uniqueness constraint; duplicate records are valid and
/// expected under load testing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub name: String,
    pub data: String,
}

/// Action requested from the broker.
///
/// Currently a single variant, but kept an enum so new actions can be added
/// without changing the envelope shape on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Log,
}

/// The unit dispatched over any transport.
///
/// Wire form: `{"action": "log", "log": {"name": ..., "data": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub action: Action,
    #[serde(rename = "log")]
    pub record: LogRecord,
}

impl RequestEnvelope {
    pub fn log(record: LogRecord) -> Self {
        Self {
            action: Action::Log,
            record,
        }
    }
}
