//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{RoomDispatcher, RoomSnapshot};

pub struct GetRoomsUseCase {
    rooms: Arc<dyn RoomDispatcher>,
}

impl GetRoomsUseCase {
    pub fn new(rooms: Arc<dyn RoomDispatcher>) -> Self {
        Self { rooms }
    }

    /// ルーム ID 順のスナップショット一覧
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.rooms.snapshots().await
    }
}
