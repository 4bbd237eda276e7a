//! UseCase: チャットメッセージ処理
//!
//! 送信・既読・削除の 3 操作をルームへ転送します。
//! 参加者かどうかの判定や既読・削除の状態管理はルーム側で行います。

use std::sync::Arc;

use crate::domain::{ChatMessage, ConnectionId, MessageId, RoomCommand, RoomDispatcher, RoomId};

use super::{dispatch_to, error::RoomCommandError};

/// チャットメッセージのユースケース
pub struct SendMessageUseCase {
    rooms: Arc<dyn RoomDispatcher>,
}

impl SendMessageUseCase {
    pub fn new(rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { rooms }
    }

    /// メッセージを送信者を含むルーム全員へ配信する
    pub fn send(&self, sender: ConnectionId, message: ChatMessage) -> Result<(), RoomCommandError> {
        let room = message.room.clone();
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::SendMessage { sender, message },
        )
    }

    /// 既読を送信者以外へ通知する
    pub fn mark_seen(
        &self,
        reporter: ConnectionId,
        room: String,
        message_id: String,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::MarkSeen {
                reporter,
                message_id: MessageId::from(message_id),
            },
        )
    }

    /// 削除をルーム全員へ通知する
    pub fn delete(
        &self,
        requester: ConnectionId,
        room: String,
        message_id: String,
    ) -> Result<(), RoomCommandError> {
        let room = RoomId::new(room)?;
        dispatch_to(
            self.rooms.as_ref(),
            &room,
            RoomCommand::DeleteMessage {
                requester,
                message_id: MessageId::from(message_id),
            },
        )
    }
}
