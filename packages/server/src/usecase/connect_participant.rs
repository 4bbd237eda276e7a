//! UseCase: 接続受付処理
//!
//! WebSocket のアップグレード前に呼ばれ、接続 ID の払い出しと
//! 送信キューの登録を行います。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionRegistry, MessagePusher, PusherChannel, RepositoryError};

use super::error::ConnectError;

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 新しい接続を登録し、送信キューを MessagePusher に紐付ける
    pub async fn execute(&self, sender: PusherChannel) -> Result<Connection, ConnectError> {
        let connection = self.registry.register().await.map_err(|e| match e {
            RepositoryError::CapacityExceeded(limit) => ConnectError::CapacityExceeded(limit),
            other => ConnectError::Registry(other.to_string()),
        })?;

        self.message_pusher
            .register_client(connection.id, sender)
            .await;

        tracing::info!(
            "Connection '{}' registered ({} active)",
            connection.id,
            self.registry.count().await
        );
        Ok(connection)
    }
}
