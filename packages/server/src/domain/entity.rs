//! Domain entities.

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, DisplayName, MessageId, RoomId, Timestamp};

/// One live connection as tracked by the connection registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub display_name: Option<DisplayName>,
    pub room: Option<RoomId>,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            display_name: None,
            room: None,
            connected_at,
        }
    }
}

/// A connection's presence inside a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub name: DisplayName,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(connection_id: ConnectionId, name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            name,
            joined_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Audio,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Seen,
}

/// File blob carried inside a chat message. `data` is usually a data URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

/// Kind-specific body of a chat message.
///
/// Which field is present is the sender's business; the server forwards
/// whatever it was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageContent {
    pub text: Option<String>,
    pub audio: Option<String>,
    pub file: Option<FileAttachment>,
    pub duration: Option<f64>,
    /// Client fields the server does not interpret, echoed back as sent.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A chat message as relayed to a room.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room: RoomId,
    pub author: DisplayName,
    pub kind: MessageKind,
    pub content: MessageContent,
    /// Client-formatted send time, forwarded untouched.
    pub time: String,
    pub status: DeliveryStatus,
}
