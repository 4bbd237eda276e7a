//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信キュー（`UnboundedSender`）を管理
//! - 接続へのフレーム一斉送信（broadcast）
//!
//! WebSocket の受付と送信キューの生成は UI 層（`ui/handler/websocket.rs`）で行い、
//! ここでは受け取った sender を使って送信だけを行います。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// Outbound queues of every live connection, keyed by connection id.
pub type ClientChannels = Arc<RwLock<HashMap<ConnectionId, PusherChannel>>>;

pub struct WebSocketMessagePusher {
    clients: ClientChannels,
}

impl WebSocketMessagePusher {
    pub fn new(clients: ClientChannels) -> Self {
        Self { clients }
    }

    #[cfg(test)]
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.write().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.write().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.read().await;
        let total = targets.len();
        let mut failed = 0;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if sender.send(content.to_string()).is_err() {
                        tracing::debug!("Outbound queue of connection '{}' is closed", target);
                        failed += 1;
                    }
                }
                None => {
                    tracing::debug!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        if failed > 0 {
            return Err(MessagePushError::PartialDelivery { failed, total });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_broadcast_success() {
        // テスト項目: 対象の接続全員にフレームが届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        pusher.register_client(alice, tx1).await;
        pusher.register_client(bob, tx2).await;

        // when (操作):
        let result = pusher.broadcast(vec![alice, bob], "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("Hello".to_string()));
        assert_eq!(rx2.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_skips_unknown_connections() {
        // テスト項目: 一部の接続が存在しなくても残りには届き、エラーにもならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        pusher.register_client(alice, tx1).await;
        pusher.register_client(bob, tx2).await;

        // when (操作):
        let targets = vec![alice, ConnectionId::generate(), bob];
        let result = pusher.broadcast(targets, "Broadcast").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("Broadcast".to_string()));
        assert_eq!(rx2.recv().await, Some("Broadcast".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_reports_closed_queues() {
        // テスト項目: 受信側が閉じた接続があっても他には届き、失敗数が報告される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        pusher.register_client(alice, tx1).await;
        pusher.register_client(bob, tx2).await;
        drop(rx1);

        // when (操作):
        let result = pusher.broadcast(vec![alice, bob], "Hello").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::PartialDelivery {
                failed: 1,
                total: 2
            })
        );
        assert_eq!(rx2.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除した接続には届かない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = ConnectionId::generate();
        pusher.register_client(alice, tx).await;

        // when (操作):
        pusher.unregister_client(&alice).await;
        pusher.unregister_client(&alice).await;

        // then (期待する結果):
        assert_eq!(pusher.client_count().await, 0);
        assert!(pusher.broadcast(vec![alice], "Hello").await.is_ok());
        assert_eq!(rx.recv().await, None);
    }
}
