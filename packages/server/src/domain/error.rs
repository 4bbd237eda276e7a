//! Domain-level error types.

use thiserror::Error;

/// Raised when constructing a value object from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("display name must not be empty")]
    DisplayNameEmpty,
}

/// Rejected call state transitions. Never surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("a call is already ringing or active in this room")]
    AlreadyInProgress,

    #[error("no call is ringing in this room")]
    NotRinging,

    #[error("no call is in progress in this room")]
    NoCallInProgress,
}

/// Rejected message delivery state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("message '{0}' was already deleted")]
    AlreadyDeleted(String),

    #[error("message '{0}' may only be deleted by its author")]
    NotAuthor(String),
}

/// Reasons a room command is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("connection '{0}' is not a participant of this room")]
    NotAParticipant(String),

    #[error("message room '{message_room}' does not match room '{room}'")]
    RoomMismatch { room: String, message_room: String },

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Connection registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("connection limit of {0} reached")]
    CapacityExceeded(usize),
}

/// Fan-out failures. Delivery to the other recipients has already happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("outbound queue closed for {failed} of {total} recipients")]
    PartialDelivery { failed: usize, total: usize },
}
