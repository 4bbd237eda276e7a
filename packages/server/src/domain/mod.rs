//! Domain layer: room, call and delivery rules with no I/O.

pub mod call;
pub mod command;
pub mod delivery;
pub mod entity;
pub mod error;
pub mod event;
pub mod pusher;
pub mod repository;
pub mod room;
pub mod value_object;

pub use call::{CallCoordinator, CallKind, CallSession, CallState};
pub use command::{RoomCommand, RoomSnapshot};
pub use delivery::{DEFAULT_LEDGER_CAPACITY, MessageLedger};
pub use entity::{
    ChatMessage, Connection, DeliveryStatus, FileAttachment, MessageContent, MessageKind,
    Participant,
};
pub use error::{
    CallError, DeliveryError, MessagePushError, RepositoryError, RoomError, ValueObjectError,
};
pub use event::{Audience, CallReply, Delivery, RoomEvent, Signal, SignalKind};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{ConnectionRegistry, RoomDispatcher};
pub use room::Room;
pub use value_object::{ConnectionId, DisplayName, MessageId, OpaquePayload, RoomId, Timestamp};
