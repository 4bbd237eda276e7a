//! UseCase: 入力中表示

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomCommand, RoomDispatcher, RoomId};

use super::{dispatch_to, error::RoomCommandError};

pub struct TypingUseCase {
    rooms: Arc<dyn RoomDispatcher>,
}

impl TypingUseCase {
    pub fn new(rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { rooms }
    }

    pub fn typing(
        &self,
        sender: ConnectionId,
        room: String,
        username: String,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::Typing { sender, username },
        )
    }

    pub fn stop_typing(&self, sender: ConnectionId, room: String) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(self.rooms.as_ref(), &room, RoomCommand::StopTyping { sender })
    }
}
