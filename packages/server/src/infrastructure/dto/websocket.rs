//! WebSocket wire format.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! `data` is omitted for events that carry nothing.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::domain::{CallKind, DeliveryStatus, MessageKind};

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a valid event envelope: {0}")]
    InvalidFrame(#[source] serde_json::Error),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("event '{0}' carries no data")]
    MissingData(String),

    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Option<Box<RawValue>>,
}

// ========================================
// Payloads
// ========================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinRoomPayload {
    pub room: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub data: String,
}

/// Chat message as sent by clients and echoed back by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: String,
    pub room: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub time: String,
    #[serde(default = "default_status")]
    pub status: DeliveryStatus,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_status() -> DeliveryStatus {
    DeliveryStatus::Sent
}

/// `{room, messageId}` as used by `message_seen` and `delete_message`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageRefPayload {
    pub room: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypingPayload {
    pub room: String,
    pub username: String,
}

/// `stop_typing` carries the bare room id; an object form is tolerated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StopTypingPayload {
    Room(String),
    Object { room: String },
}

impl StopTypingPayload {
    pub fn room(&self) -> &str {
        match self {
            StopTypingPayload::Room(room) | StopTypingPayload::Object { room } => room,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallUserPayload {
    pub room: String,
    pub from: String,
    #[serde(rename = "type")]
    pub kind: CallKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingCallPayload {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: CallKind,
}

/// Shape shared by `accept_call`/`call_accepted` and `reject_call`/`call_rejected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallReplyPayload {
    pub room: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CallKind>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndCallPayload {
    pub room: String,
}

#[derive(Debug, Deserialize)]
struct RoomRef {
    room: String,
}

/// Signaling frame: routed by `room`, relayed as the exact bytes received.
#[derive(Debug, Clone)]
pub struct SignalPayload {
    pub room: String,
    pub raw: Box<RawValue>,
}

impl SignalPayload {
    fn parse(event: &str, raw: Box<RawValue>) -> Result<Self, ProtocolError> {
        let RoomRef { room } = payload(event, &raw)?;
        Ok(Self { room, raw })
    }
}

// ========================================
// Client → Server
// ========================================

#[derive(Debug, Clone)]
pub enum ClientMessage {
    JoinRoom(JoinRoomPayload),
    SendMessage(MessagePayload),
    MessageSeen(MessageRefPayload),
    DeleteMessage(MessageRefPayload),
    Typing(TypingPayload),
    StopTyping(StopTypingPayload),
    CallUser(CallUserPayload),
    AcceptCall(CallReplyPayload),
    RejectCall(CallReplyPayload),
    EndCall(EndCallPayload),
    WebrtcOffer(SignalPayload),
    WebrtcAnswer(SignalPayload),
    IceCandidate(SignalPayload),
}

impl ClientMessage {
    /// Parse one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let Envelope { event, data } =
            serde_json::from_str(text).map_err(ProtocolError::InvalidFrame)?;
        let data = data.ok_or_else(|| ProtocolError::MissingData(event.clone()))?;
        let event = event.as_str();

        let message = match event {
            "join_room" => ClientMessage::JoinRoom(payload(event, &data)?),
            "send_message" => ClientMessage::SendMessage(payload(event, &data)?),
            "message_seen" => ClientMessage::MessageSeen(payload(event, &data)?),
            "delete_message" => ClientMessage::DeleteMessage(payload(event, &data)?),
            "typing" => ClientMessage::Typing(payload(event, &data)?),
            "stop_typing" => ClientMessage::StopTyping(payload(event, &data)?),
            "call_user" => ClientMessage::CallUser(payload(event, &data)?),
            "accept_call" => ClientMessage::AcceptCall(payload(event, &data)?),
            "reject_call" => ClientMessage::RejectCall(payload(event, &data)?),
            "end_call" => ClientMessage::EndCall(payload(event, &data)?),
            "webrtc_offer" => ClientMessage::WebrtcOffer(SignalPayload::parse(event, data)?),
            "webrtc_answer" => ClientMessage::WebrtcAnswer(SignalPayload::parse(event, data)?),
            "ice_candidate" => ClientMessage::IceCandidate(SignalPayload::parse(event, data)?),
            other => return Err(ProtocolError::UnknownEvent(other.to_string())),
        };
        Ok(message)
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::JoinRoom(_) => "join_room",
            ClientMessage::SendMessage(_) => "send_message",
            ClientMessage::MessageSeen(_) => "message_seen",
            ClientMessage::DeleteMessage(_) => "delete_message",
            ClientMessage::Typing(_) => "typing",
            ClientMessage::StopTyping(_) => "stop_typing",
            ClientMessage::CallUser(_) => "call_user",
            ClientMessage::AcceptCall(_) => "accept_call",
            ClientMessage::RejectCall(_) => "reject_call",
            ClientMessage::EndCall(_) => "end_call",
            ClientMessage::WebrtcOffer(_) => "webrtc_offer",
            ClientMessage::WebrtcAnswer(_) => "webrtc_answer",
            ClientMessage::IceCandidate(_) => "ice_candidate",
        }
    }
}

fn payload<T: DeserializeOwned>(event: &str, data: &RawValue) -> Result<T, ProtocolError> {
    serde_json::from_str(data.get()).map_err(|source| ProtocolError::InvalidPayload {
        event: event.to_string(),
        source,
    })
}

// ========================================
// Server → Client
// ========================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomUsers(Vec<String>),
    ReceiveMessage(MessagePayload),
    MessageSeen(String),
    MessageDeleted(String),
    UserTyping(String),
    UserStopTyping,
    IncomingCall(IncomingCallPayload),
    CallAccepted(CallReplyPayload),
    CallRejected(CallReplyPayload),
    CallEnded,
    WebrtcOffer(Box<RawValue>),
    WebrtcAnswer(Box<RawValue>),
    IceCandidate(Box<RawValue>),
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_room() {
        // テスト項目: join_room フレームが解析される
        // given (前提条件):
        let text = r#"{"event":"join_room","data":{"room":"r1","username":"alice"}}"#;

        // when (操作):
        let message = ClientMessage::parse(text).unwrap();

        // then (期待する結果):
        match message {
            ClientMessage::JoinRoom(payload) => {
                assert_eq!(payload.room, "r1");
                assert_eq!(payload.username, "alice");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_send_message_defaults_status() {
        // テスト項目: status 省略時は sent として解析される
        // given (前提条件):
        let text = r#"{"event":"send_message","data":{"id":"m1","room":"r1","author":"alice","message":"hi","time":"10:00","type":"text"}}"#;

        // when (操作):
        let message = ClientMessage::parse(text).unwrap();

        // then (期待する結果):
        match message {
            ClientMessage::SendMessage(payload) => {
                assert_eq!(payload.status, DeliveryStatus::Sent);
                assert_eq!(payload.kind, MessageKind::Text);
                assert_eq!(payload.message.as_deref(), Some("hi"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_send_message_keeps_unknown_fields() {
        // テスト項目: 未知のフィールドは保持され、再シリアライズ時にそのまま出力される
        // given (前提条件):
        let text = r#"{"event":"send_message","data":{"id":"m1","room":"r1","author":"alice","message":"hi","time":"10:00","type":"text","replyTo":"m0","reactions":{"+1":2}}}"#;

        // when (操作):
        let payload = match ClientMessage::parse(text).unwrap() {
            ClientMessage::SendMessage(payload) => payload,
            other => panic!("unexpected message: {:?}", other),
        };
        let echoed = serde_json::to_value(&payload).unwrap();

        // then (期待する結果):
        assert_eq!(payload.extra.len(), 2);
        assert!(!payload.extra.contains_key("room"));
        assert_eq!(echoed["replyTo"], "m0");
        assert_eq!(echoed["reactions"]["+1"], 2);
        assert_eq!(echoed["status"], "sent");
    }

    #[test]
    fn test_parse_stop_typing_accepts_bare_room() {
        // テスト項目: stop_typing はルーム ID 文字列とオブジェクトの両方を受け付ける
        // given (前提条件):
        let bare = r#"{"event":"stop_typing","data":"r1"}"#;
        let object = r#"{"event":"stop_typing","data":{"room":"r2"}}"#;

        // when (操作):
        let bare = ClientMessage::parse(bare).unwrap();
        let object = ClientMessage::parse(object).unwrap();

        // then (期待する結果):
        assert!(matches!(bare, ClientMessage::StopTyping(ref p) if p.room() == "r1"));
        assert!(matches!(object, ClientMessage::StopTyping(ref p) if p.room() == "r2"));
    }

    #[test]
    fn test_parse_signal_keeps_raw_bytes() {
        // テスト項目: シグナリングのペイロードは受信したバイト列のまま保持される
        // given (前提条件):
        let data = r#"{"room":"r1","candidate":{"candidate":"candidate:0 1 UDP 2122252543 10.0.0.1 54321 typ host","sdpMid":"0"},  "extra":[1,2,3]}"#;
        let text = format!(r#"{{"event":"ice_candidate","data":{}}}"#, data);

        // when (操作):
        let message = ClientMessage::parse(&text).unwrap();

        // then (期待する結果):
        match message {
            ClientMessage::IceCandidate(signal) => {
                assert_eq!(signal.room, "r1");
                assert_eq!(signal.raw.get(), data);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        // テスト項目: 不正なフレームはエラーとして扱われる
        // given (前提条件):
        let not_json = "hello";
        let unknown = r#"{"event":"dance","data":{}}"#;
        let no_data = r#"{"event":"join_room"}"#;
        let bad_payload = r#"{"event":"join_room","data":{"room":"r1"}}"#;
        let bad_call_type = r#"{"event":"call_user","data":{"room":"r1","from":"a","type":"hologram"}}"#;

        // when (操作) / then (期待する結果):
        assert!(matches!(
            ClientMessage::parse(not_json),
            Err(ProtocolError::InvalidFrame(_))
        ));
        assert!(matches!(
            ClientMessage::parse(unknown),
            Err(ProtocolError::UnknownEvent(ref e)) if e == "dance"
        ));
        assert!(matches!(
            ClientMessage::parse(no_data),
            Err(ProtocolError::MissingData(_))
        ));
        assert!(matches!(
            ClientMessage::parse(bad_payload),
            Err(ProtocolError::InvalidPayload { .. })
        ));
        assert!(matches!(
            ClientMessage::parse(bad_call_type),
            Err(ProtocolError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_server_message_envelopes() {
        // テスト項目: サーバーからのイベントが {event, data} 形式で直列化される
        // given (前提条件):
        let users = ServerMessage::RoomUsers(vec!["alice".to_string(), "bob".to_string()]);
        let ended = ServerMessage::CallEnded;
        let seen = ServerMessage::MessageSeen("m1".to_string());

        // when (操作):
        let users = users.to_json().unwrap();
        let ended = ended.to_json().unwrap();
        let seen = seen.to_json().unwrap();

        // then (期待する結果):
        assert_eq!(users, r#"{"event":"room_users","data":["alice","bob"]}"#);
        assert_eq!(ended, r#"{"event":"call_ended"}"#);
        assert_eq!(seen, r#"{"event":"message_seen","data":"m1"}"#);
    }

    #[test]
    fn test_server_message_relays_raw_signal() {
        // テスト項目: シグナリングの中継は受信バイト列がそのまま data に入る
        // given (前提条件):
        let data = r#"{"room":"r1", "offer":{"type":"offer","sdp":"v=0\r\n"}}"#;
        let raw: Box<RawValue> = serde_json::from_str(data).unwrap();

        // when (操作):
        let json = ServerMessage::WebrtcOffer(raw).to_json().unwrap();

        // then (期待する結果):
        assert_eq!(json, format!(r#"{{"event":"webrtc_offer","data":{}}}"#, data));
    }
}
