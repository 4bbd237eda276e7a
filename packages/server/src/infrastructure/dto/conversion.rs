//! Conversion logic between DTOs and domain entities.

use parley_shared::time::millis_to_rfc3339;

use crate::domain::{
    CallKind, CallReply, CallState, ChatMessage, DisplayName, FileAttachment, MessageContent,
    MessageId, Participant, RoomEvent, RoomId, RoomSnapshot, SignalKind, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::MessagePayload> for ChatMessage {
    type Error = ValueObjectError;

    fn try_from(payload: dto::MessagePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::from(payload.id),
            room: RoomId::new(payload.room)?,
            author: DisplayName::new(payload.author)?,
            kind: payload.kind,
            content: MessageContent {
                text: payload.message,
                audio: payload.audio,
                file: payload.file.map(|file| FileAttachment {
                    name: file.name,
                    mime_type: file.mime_type,
                    data: file.data,
                }),
                duration: payload.duration,
                extra: payload.extra,
            },
            time: payload.time,
            status: payload.status,
        })
    }
}

impl From<dto::CallReplyPayload> for CallReply {
    fn from(payload: dto::CallReplyPayload) -> Self {
        Self {
            from: payload.from,
            to: payload.to,
            kind: payload.kind,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for dto::MessagePayload {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.into_string(),
            room: model.room.into_string(),
            author: model.author.into_string(),
            message: model.content.text,
            audio: model.content.audio,
            file: model.content.file.map(|file| dto::FilePayload {
                name: file.name,
                mime_type: file.mime_type,
                data: file.data,
            }),
            duration: model.content.duration,
            time: model.time,
            status: model.status,
            kind: model.kind,
            extra: model.content.extra,
        }
    }
}

fn reply_payload(room: &RoomId, reply: CallReply) -> dto::CallReplyPayload {
    dto::CallReplyPayload {
        room: room.as_str().to_string(),
        from: reply.from,
        to: reply.to,
        kind: reply.kind,
    }
}

/// Wire form of an event emitted by `room`.
pub fn server_message(room: &RoomId, event: RoomEvent) -> dto::ServerMessage {
    match event {
        RoomEvent::Members(names) => {
            dto::ServerMessage::RoomUsers(names.into_iter().map(|n| n.into_string()).collect())
        }
        RoomEvent::MessageReceived(message) => dto::ServerMessage::ReceiveMessage(message.into()),
        RoomEvent::MessageSeen(id) => dto::ServerMessage::MessageSeen(id.into_string()),
        RoomEvent::MessageDeleted(id) => dto::ServerMessage::MessageDeleted(id.into_string()),
        RoomEvent::UserTyping(username) => dto::ServerMessage::UserTyping(username),
        RoomEvent::UserStopTyping => dto::ServerMessage::UserStopTyping,
        RoomEvent::IncomingCall { from, kind } => {
            dto::ServerMessage::IncomingCall(dto::IncomingCallPayload { from, kind })
        }
        RoomEvent::CallAccepted(reply) => {
            dto::ServerMessage::CallAccepted(reply_payload(room, reply))
        }
        RoomEvent::CallRejected(reply) => {
            dto::ServerMessage::CallRejected(reply_payload(room, reply))
        }
        RoomEvent::CallEnded => dto::ServerMessage::CallEnded,
        RoomEvent::Signal(signal) => {
            let raw = signal.payload.into_raw();
            match signal.kind {
                SignalKind::Offer => dto::ServerMessage::WebrtcOffer(raw),
                SignalKind::Answer => dto::ServerMessage::WebrtcAnswer(raw),
                SignalKind::IceCandidate => dto::ServerMessage::IceCandidate(raw),
            }
        }
    }
}

fn call_kind_name(kind: CallKind) -> &'static str {
    match kind {
        CallKind::Audio => "audio",
        CallKind::Video => "video",
    }
}

impl From<&Participant> for http::ParticipantDetailDto {
    fn from(participant: &Participant) -> Self {
        Self {
            connection_id: participant.connection_id.to_string(),
            username: participant.name.as_str().to_string(),
            joined_at: millis_to_rfc3339(participant.joined_at.value()),
        }
    }
}

impl From<&CallState> for http::CallDetailDto {
    fn from(state: &CallState) -> Self {
        let session = state.session();
        Self {
            state: state.name().to_string(),
            kind: session.map(|s| call_kind_name(s.kind).to_string()),
            caller: session.map(|s| s.caller_name.clone()),
        }
    }
}

impl From<RoomSnapshot> for http::RoomSummaryDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.into_string(),
            participants: snapshot
                .participants
                .into_iter()
                .map(|p| p.name.into_string())
                .collect(),
            call_state: snapshot.call.name().to_string(),
            created_at: millis_to_rfc3339(snapshot.created_at.value()),
        }
    }
}

impl From<RoomSnapshot> for http::RoomDetailDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            participants: snapshot.participants.iter().map(Into::into).collect(),
            call: (&snapshot.call).into(),
            created_at: millis_to_rfc3339(snapshot.created_at.value()),
            id: snapshot.id.into_string(),
        }
    }
}
