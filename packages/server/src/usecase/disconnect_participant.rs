//! UseCase: 切断処理
//!
//! 接続の登録解除、所属ルームからの退出、送信キューの解除を行います。
//! 何度呼ばれても安全です。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, RoomCommand, RoomDispatcher, Timestamp,
};

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomDispatcher>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomDispatcher>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId) {
        // 先に送信キューを外し、退出の通知が本人に届かないようにする
        self.message_pusher.unregister_client(connection_id).await;

        let Some(connection) = self.registry.unregister(connection_id).await else {
            return;
        };

        if let Some(room) = &connection.room {
            self.rooms.dispatch(
                room,
                RoomCommand::Leave {
                    connection_id: *connection_id,
                },
            );
        }

        let name = connection
            .display_name
            .as_ref()
            .map_or("-", |name| name.as_str());
        tracing::info!(
            "Connection '{}' ({}) left after {}ms",
            connection_id,
            name,
            Timestamp::now().value() - connection.connected_at.value()
        );
    }
}
