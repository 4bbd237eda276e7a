//! UseCase: ルーム参加処理
//!
//! 接続ごとに所属できるルームは 1 つだけです。別のルームへ参加すると、
//! 直前のルームからは退出します。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DisplayName, Participant, RepositoryError, RoomCommand,
    RoomDispatcher, RoomId, Timestamp,
};

use super::error::JoinRoomError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomDispatcher>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { registry, rooms }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room: String,
        username: String,
    ) -> Result<RoomId, JoinRoomError> {
        let room_id = RoomId::new(room)?;
        let name = DisplayName::new(username)?;

        let previous = self
            .registry
            .assign_room(&connection_id, room_id.clone(), name.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::ConnectionNotFound(id) => JoinRoomError::ConnectionNotFound(id),
                other => JoinRoomError::ConnectionNotFound(other.to_string()),
            })?;

        if let Some(previous) = previous
            && previous != room_id
        {
            self.rooms
                .dispatch(&previous, RoomCommand::Leave { connection_id });
        }

        self.rooms.dispatch_or_create(
            &room_id,
            RoomCommand::Join {
                participant: Participant::new(connection_id, name, Timestamp::now()),
            },
        );

        tracing::info!("Connection '{}' joined room '{}'", connection_id, room_id);
        Ok(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ValueObjectError, repository::MockRoomDispatcher};
    use crate::infrastructure::repository::InMemoryConnectionRegistry;

    fn expect_join(rooms: &mut MockRoomDispatcher, room: &'static str, name: &'static str) {
        rooms
            .expect_dispatch_or_create()
            .withf(move |room_id, command| {
                room_id.as_str() == room
                    && matches!(command, RoomCommand::Join { participant } if participant.name.as_str() == name)
            })
            .times(1)
            .return_const(());
    }

    #[tokio::test]
    async fn test_join_room_creates_or_joins() {
        // テスト項目: 参加するとルームに Join コマンドが送られる
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new(10));
        let connection = registry.register().await.unwrap();
        let mut rooms = MockRoomDispatcher::new();
        expect_join(&mut rooms, "r1", "alice");
        rooms.expect_dispatch().times(0);
        let usecase = JoinRoomUseCase::new(registry.clone(), Arc::new(rooms));

        // when (操作):
        let result = usecase
            .execute(connection.id, "r1".to_string(), "alice".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "r1");
        let stored = registry.unregister(&connection.id).await.unwrap();
        assert_eq!(stored.room.map(|r| r.into_string()), Some("r1".to_string()));
    }

    #[tokio::test]
    async fn test_join_other_room_leaves_previous() {
        // テスト項目: 別のルームへ参加すると直前のルームから退出する
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new(10));
        let connection = registry.register().await.unwrap();
        let id = connection.id;
        let mut rooms = MockRoomDispatcher::new();
        expect_join(&mut rooms, "r1", "alice");
        expect_join(&mut rooms, "r2", "alice");
        rooms
            .expect_dispatch()
            .withf(move |room_id, command| {
                room_id.as_str() == "r1"
                    && matches!(command, RoomCommand::Leave { connection_id } if *connection_id == id)
            })
            .times(1)
            .return_const(true);
        let usecase = JoinRoomUseCase::new(registry, Arc::new(rooms));

        // when (操作):
        usecase
            .execute(id, "r1".to_string(), "alice".to_string())
            .await
            .unwrap();
        let result = usecase
            .execute(id, "r2".to_string(), "alice".to_string())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rejoin_same_room_does_not_leave() {
        // テスト項目: 同じルームへの再参加では退出コマンドは送られない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new(10));
        let connection = registry.register().await.unwrap();
        let mut rooms = MockRoomDispatcher::new();
        expect_join(&mut rooms, "r1", "alice");
        expect_join(&mut rooms, "r1", "alicia");
        rooms.expect_dispatch().times(0);
        let usecase = JoinRoomUseCase::new(registry, Arc::new(rooms));

        // when (操作):
        usecase
            .execute(connection.id, "r1".to_string(), "alice".to_string())
            .await
            .unwrap();
        let result = usecase
            .execute(connection.id, "r1".to_string(), "alicia".to_string())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_join_with_blank_name_is_rejected() {
        // テスト項目: 空の表示名では参加できない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new(10));
        let connection = registry.register().await.unwrap();
        let mut rooms = MockRoomDispatcher::new();
        rooms.expect_dispatch_or_create().times(0);
        let usecase = JoinRoomUseCase::new(registry, Arc::new(rooms));

        // when (操作):
        let result = usecase
            .execute(connection.id, "r1".to_string(), " ".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinRoomError::InvalidInput(ValueObjectError::DisplayNameEmpty))
        );
    }
}
