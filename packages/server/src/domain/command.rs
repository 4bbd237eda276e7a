//! Commands a room processes, one at a time, in arrival order.

use tokio::sync::oneshot;

use super::{
    call::{CallKind, CallState},
    entity::{ChatMessage, Participant},
    event::{CallReply, Signal},
    value_object::{ConnectionId, MessageId, RoomId, Timestamp},
};

#[derive(Debug)]
pub enum RoomCommand {
    Join {
        participant: Participant,
    },
    Leave {
        connection_id: ConnectionId,
    },
    SendMessage {
        sender: ConnectionId,
        message: ChatMessage,
    },
    MarkSeen {
        reporter: ConnectionId,
        message_id: MessageId,
    },
    DeleteMessage {
        requester: ConnectionId,
        message_id: MessageId,
    },
    Typing {
        sender: ConnectionId,
        username: String,
    },
    StopTyping {
        sender: ConnectionId,
    },
    Invite {
        caller: ConnectionId,
        from: String,
        kind: CallKind,
    },
    Accept {
        callee: ConnectionId,
        reply: CallReply,
    },
    Reject {
        callee: ConnectionId,
        reply: CallReply,
    },
    EndCall {
        requester: ConnectionId,
    },
    Signal {
        sender: ConnectionId,
        signal: Signal,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

impl RoomCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RoomCommand::Join { .. } => "join",
            RoomCommand::Leave { .. } => "leave",
            RoomCommand::SendMessage { .. } => "send_message",
            RoomCommand::MarkSeen { .. } => "message_seen",
            RoomCommand::DeleteMessage { .. } => "delete_message",
            RoomCommand::Typing { .. } => "typing",
            RoomCommand::StopTyping { .. } => "stop_typing",
            RoomCommand::Invite { .. } => "call_user",
            RoomCommand::Accept { .. } => "accept_call",
            RoomCommand::Reject { .. } => "reject_call",
            RoomCommand::EndCall { .. } => "end_call",
            RoomCommand::Signal { .. } => "signal",
            RoomCommand::Snapshot { .. } => "snapshot",
        }
    }
}

/// Read-only copy of a room's state.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub participants: Vec<Participant>,
    pub call: CallState,
}
