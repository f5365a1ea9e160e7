//! Event and message models for the WebSocket channel.

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::record::Record;

/// Error code for a frame that could not be parsed.
pub const CODE_MALFORMED: u16 = 4000;
/// Error code for a join without a usable name.
pub const CODE_INVALID_NAME: u16 = 4001;

/// Event pushed over WebSocket to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionConfirmed,
    RosterUpdate(Vec<String>),
    RecordCreated(Record),
    RecordRemoved { id: i64 },
    Pong,
    Error { message: String, code: u16 },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>, code: u16) -> Self {
        ServerEvent::Error {
            message: message.into(),
            code,
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_frame(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// WebSocket client message: join / ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { data: JoinPayload },
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinPayload {
    #[serde(alias = "displayName", alias = "username")]
    pub name: String,
}
