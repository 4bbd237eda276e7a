//! Events a room emits and who should receive them.

use super::{
    call::CallKind,
    entity::ChatMessage,
    value_object::{ConnectionId, DisplayName, MessageId, OpaquePayload},
};

/// Recipients of a room event, resolved against the membership at the
/// moment the event is delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    Everyone,
    EveryoneExcept(ConnectionId),
}

/// Names carried by `accept_call` / `reject_call` and echoed to the room.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReply {
    pub from: String,
    pub to: String,
    pub kind: Option<CallKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// WebRTC signaling metadata; the payload is never inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub payload: OpaquePayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Membership snapshot, names in join order.
    Members(Vec<DisplayName>),
    MessageReceived(ChatMessage),
    MessageSeen(MessageId),
    MessageDeleted(MessageId),
    UserTyping(String),
    UserStopTyping,
    IncomingCall { from: String, kind: CallKind },
    CallAccepted(CallReply),
    CallRejected(CallReply),
    CallEnded,
    Signal(Signal),
}

/// One event addressed to an audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub audience: Audience,
    pub event: RoomEvent,
}

impl Delivery {
    pub fn to_everyone(event: RoomEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    pub fn to_others(sender: ConnectionId, event: RoomEvent) -> Self {
        Self {
            audience: Audience::EveryoneExcept(sender),
            event,
        }
    }
}
