//! UseCase: WebRTC シグナリングの中継

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomCommand, RoomDispatcher, RoomId, Signal};

use super::{dispatch_to, error::RoomCommandError};

pub struct RelaySignalUseCase {
    rooms: Arc<dyn RoomDispatcher>,
}

impl RelaySignalUseCase {
    pub fn new(rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { rooms }
    }

    /// 通話中のルームで、送信者以外へ offer / answer / ICE candidate を中継する
    pub fn execute(
        &self,
        sender: ConnectionId,
        room: String,
        signal: Signal,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::Signal { sender, signal },
        )
    }
}
