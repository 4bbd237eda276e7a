//! InMemory Connection Registry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, DisplayName, RepositoryError, RoomId, Timestamp,
};

/// Connection registry bounded by `max_connections`.
pub struct InMemoryConnectionRegistry {
    connections: Arc<Mutex<HashMap<ConnectionId, Connection>>>,
    max_connections: usize,
}

impl InMemoryConnectionRegistry {
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            max_connections,
        }
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self) -> Result<Connection, RepositoryError> {
        let mut connections = self.connections.lock().await;
        if connections.len() >= self.max_connections {
            return Err(RepositoryError::CapacityExceeded(self.max_connections));
        }

        let mut id = ConnectionId::generate();
        while connections.contains_key(&id) {
            id = ConnectionId::generate();
        }
        let connection = Connection::new(id, Timestamp::now());
        connections.insert(id, connection.clone());
        Ok(connection)
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.lock().await.remove(connection_id)
    }

    async fn assign_room(
        &self,
        connection_id: &ConnectionId,
        room: RoomId,
        name: DisplayName,
    ) -> Result<Option<RoomId>, RepositoryError> {
        let mut connections = self.connections.lock().await;
        let connection = connections
            .get_mut(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;

        connection.display_name = Some(name);
        Ok(connection.room.replace(room))
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}
