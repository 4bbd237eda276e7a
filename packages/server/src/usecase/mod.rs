//! UseCase 層
//!
//! ドメイン層の trait（ConnectionRegistry, RoomDispatcher, MessagePusher）のみに依存し、
//! 具体的な実装は UI 層で注入されます。

pub mod call;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod relay_signal;
pub mod send_message;
pub mod typing;

pub use call::CallUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, GetRoomDetailError, JoinRoomError, RoomCommandError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;

use crate::domain::{RoomCommand, RoomDispatcher, RoomId};

fn dispatch_to(
    rooms: &dyn RoomDispatcher,
    room: &RoomId,
    command: RoomCommand,
) -> Result<(), RoomCommandError> {
    if rooms.dispatch(room, command) {
        Ok(())
    } else {
        Err(RoomCommandError::RoomNotFound(room.as_str().to_string()))
    }
}
