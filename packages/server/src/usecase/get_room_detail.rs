//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{RoomDispatcher, RoomId, RoomSnapshot};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    rooms: Arc<dyn RoomDispatcher>,
}

impl GetRoomDetailUseCase {
    pub fn new(rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { rooms }
    }

    pub async fn execute(&self, room_id: String) -> Result<RoomSnapshot, GetRoomDetailError> {
        // 不正な ID のルームは存在し得ない
        let Ok(id) = RoomId::new(room_id.clone()) else {
            return Err(GetRoomDetailError::RoomNotFound(room_id));
        };
        self.rooms
            .snapshot(&id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound(room_id))
    }
}
