//! Interfaces the use cases depend on.
//!
//! Concrete implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::{
    command::{RoomCommand, RoomSnapshot},
    entity::Connection,
    error::RepositoryError,
    value_object::{ConnectionId, DisplayName, RoomId},
};

/// Tracks every live connection.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Admit a new connection.
    async fn register(&self) -> Result<Connection, RepositoryError>;

    /// Forget a connection, returning its last known state. Unknown ids
    /// yield `None`.
    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// Record that a connection joined `room` as `name`. Returns the room it
    /// was in before, if any.
    async fn assign_room(
        &self,
        connection_id: &ConnectionId,
        room: RoomId,
        name: DisplayName,
    ) -> Result<Option<RoomId>, RepositoryError>;

    async fn count(&self) -> usize;
}

/// Routes commands to the task that owns each room.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDispatcher: Send + Sync {
    /// Queue a command for an existing room. Returns `false` when the room
    /// does not exist.
    fn dispatch(&self, room_id: &RoomId, command: RoomCommand) -> bool;

    /// Queue a command, creating the room first when needed.
    fn dispatch_or_create(&self, room_id: &RoomId, command: RoomCommand);

    async fn snapshot(&self, room_id: &RoomId) -> Option<RoomSnapshot>;

    /// Snapshots of every live room, ordered by room id.
    async fn snapshots(&self) -> Vec<RoomSnapshot>;
}
