//! UseCase: 通話の開始・応答・拒否・終了
//!
//! 状態遷移の可否はルームの CallCoordinator が判定し、
//! 不正な遷移は黙って破棄されます。

use std::sync::Arc;

use crate::domain::{CallKind, CallReply, ConnectionId, RoomCommand, RoomDispatcher, RoomId};

use super::{dispatch_to, error::RoomCommandError};

pub struct CallUseCase {
    rooms: Arc<dyn RoomDispatcher>,
}

impl CallUseCase {
    pub fn new(rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { rooms }
    }

    pub fn invite(
        &self,
        caller: ConnectionId,
        room: String,
        from: String,
        kind: CallKind,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::Invite { caller, from, kind },
        )
    }

    pub fn accept(
        &self,
        callee: ConnectionId,
        room: String,
        reply: CallReply,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::Accept { callee, reply },
        )
    }

    pub fn reject(
        &self,
        callee: ConnectionId,
        room: String,
        reply: CallReply,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::Reject { callee, reply },
        )
    }

    pub fn end(&self, requester: ConnectionId, room: String) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(self.rooms.as_ref(), &room, RoomCommand::EndCall { requester })
    }
}
