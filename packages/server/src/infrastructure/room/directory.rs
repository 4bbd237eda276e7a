//! Directory of live rooms.
//!
//! Rooms are created on first join and disappear once the last participant
//! leaves. Each entry holds the command queue of the room's task.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    DEFAULT_LEDGER_CAPACITY, MessagePusher, Room, RoomCommand, RoomDispatcher, RoomId,
    RoomSnapshot, Timestamp,
};

use super::actor::RoomActor;

/// Queue of a running room task. `generation` tells a closing task apart
/// from a newer task that took over the same room id.
pub struct RoomHandle {
    sender: mpsc::UnboundedSender<RoomCommand>,
    pub(super) generation: u64,
}

pub struct RoomDirectory {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    pusher: Arc<dyn MessagePusher>,
    ledger_capacity: usize,
    next_generation: AtomicU64,
}

impl RoomDirectory {
    pub fn new(pusher: Arc<dyn MessagePusher>) -> Self {
        Self::with_ledger_capacity(pusher, DEFAULT_LEDGER_CAPACITY)
    }

    pub fn with_ledger_capacity(pusher: Arc<dyn MessagePusher>, ledger_capacity: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            pusher,
            ledger_capacity,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start the task for `room_id` and return its handle.
    fn open(&self, room_id: &RoomId) -> RoomHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let room = Room::with_ledger_capacity(room_id.clone(), Timestamp::now(), self.ledger_capacity);

        let actor = RoomActor::new(
            room,
            generation,
            receiver,
            self.pusher.clone(),
            Arc::downgrade(&self.rooms),
        );
        tokio::spawn(actor.run());

        RoomHandle { sender, generation }
    }

    fn sender(&self, room_id: &RoomId) -> Option<mpsc::UnboundedSender<RoomCommand>> {
        self.rooms.get(room_id).map(|handle| handle.sender.clone())
    }

    async fn request_snapshot(sender: mpsc::UnboundedSender<RoomCommand>) -> Option<RoomSnapshot> {
        let (reply, response) = oneshot::channel();
        sender.send(RoomCommand::Snapshot { reply }).ok()?;
        response.await.ok()
    }
}

#[async_trait]
impl RoomDispatcher for RoomDirectory {
    fn dispatch(&self, room_id: &RoomId, command: RoomCommand) -> bool {
        // 送信はエントリを保持したまま行う（クローズ判定との競合を防ぐ）
        match self.rooms.get(room_id) {
            Some(handle) => handle.sender.send(command).is_ok(),
            None => false,
        }
    }

    fn dispatch_or_create(&self, room_id: &RoomId, command: RoomCommand) {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                if let Err(mpsc::error::SendError(command)) = entry.get().sender.send(command) {
                    tracing::warn!("Room '{}' task is gone, restarting it", room_id);
                    let handle = self.open(room_id);
                    let _ = handle.sender.send(command);
                    entry.insert(handle);
                }
            }
            Entry::Vacant(entry) => {
                let handle = self.open(room_id);
                let _ = handle.sender.send(command);
                entry.insert(handle);
            }
        }
    }

    async fn snapshot(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        let sender = self.sender(room_id)?;
        Self::request_snapshot(sender).await
    }

    async fn snapshots(&self) -> Vec<RoomSnapshot> {
        let senders: Vec<_> = self
            .rooms
            .iter()
            .map(|entry| entry.value().sender.clone())
            .collect();

        let mut snapshots = Vec::with_capacity(senders.len());
        for sender in senders {
            if let Some(snapshot) = Self::request_snapshot(sender).await {
                snapshots.push(snapshot);
            }
        }
        snapshots.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        snapshots
    }
}

#[cfg(test)]
impl RoomDirectory {
    fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{ConnectionId, DisplayName, Participant};
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    async fn connect(
        pusher: &WebSocketMessagePusher,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(id, tx).await;
        (id, rx)
    }

    fn join(id: ConnectionId, name: &str) -> RoomCommand {
        RoomCommand::Join {
            participant: Participant::new(
                id,
                DisplayName::new(name.to_string()).unwrap(),
                Timestamp::now(),
            ),
        }
    }

    async fn wait_until_closed(directory: &RoomDirectory) {
        for _ in 0..100 {
            if directory.room_count() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("room was not closed");
    }

    #[tokio::test]
    async fn test_dispatch_to_unknown_room_returns_false() {
        // テスト項目: 存在しないルームへの送信は false を返す
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let directory = RoomDirectory::new(pusher);

        // when (操作):
        let delivered = directory.dispatch(
            &room_id("nowhere"),
            RoomCommand::Leave {
                connection_id: ConnectionId::generate(),
            },
        );

        // then (期待する結果):
        assert!(!delivered);
        assert_eq!(directory.room_count(), 0);
    }

    #[tokio::test]
    async fn test_join_creates_room_and_notifies_members() {
        // テスト項目: 最初の参加でルームが作られ、参加者一覧が配信される
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let directory = RoomDirectory::new(pusher.clone());
        let (alice, mut alice_rx) = connect(&pusher).await;

        // when (操作):
        directory.dispatch_or_create(&room_id("r1"), join(alice, "alice"));

        // then (期待する結果):
        assert_eq!(
            alice_rx.recv().await,
            Some(r#"{"event":"room_users","data":["alice"]}"#.to_string())
        );
        let snapshot = directory.snapshot(&room_id("r1")).await.unwrap();
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(directory.room_count(), 1);
    }

    #[tokio::test]
    async fn test_last_leave_closes_room() {
        // テスト項目: 最後の参加者が退出するとルームが削除される
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let directory = RoomDirectory::new(pusher.clone());
        let (alice, mut alice_rx) = connect(&pusher).await;
        directory.dispatch_or_create(&room_id("r1"), join(alice, "alice"));
        alice_rx.recv().await.unwrap();

        // when (操作):
        let delivered = directory.dispatch(
            &room_id("r1"),
            RoomCommand::Leave {
                connection_id: alice,
            },
        );

        // then (期待する結果):
        assert!(delivered);
        wait_until_closed(&directory).await;
        assert!(directory.snapshot(&room_id("r1")).await.is_none());
    }

    #[tokio::test]
    async fn test_room_is_recreated_after_close() {
        // テスト項目: 削除されたルームに再参加すると新しいルームが作られる
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let directory = RoomDirectory::new(pusher.clone());
        let (alice, mut alice_rx) = connect(&pusher).await;
        directory.dispatch_or_create(&room_id("r1"), join(alice, "alice"));
        alice_rx.recv().await.unwrap();
        directory.dispatch(
            &room_id("r1"),
            RoomCommand::Leave {
                connection_id: alice,
            },
        );
        wait_until_closed(&directory).await;

        // when (操作):
        directory.dispatch_or_create(&room_id("r1"), join(alice, "alice"));

        // then (期待する結果):
        assert_eq!(
            alice_rx.recv().await,
            Some(r#"{"event":"room_users","data":["alice"]}"#.to_string())
        );
        assert_eq!(directory.room_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_are_ordered_by_room_id() {
        // テスト項目: 全ルームのスナップショットがルーム ID 順に返る
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let directory = RoomDirectory::new(pusher.clone());
        let (alice, _alice_rx) = connect(&pusher).await;
        let (bob, _bob_rx) = connect(&pusher).await;
        directory.dispatch_or_create(&room_id("zeta"), join(alice, "alice"));
        directory.dispatch_or_create(&room_id("alpha"), join(bob, "bob"));

        // when (操作):
        let snapshots = directory.snapshots().await;

        // then (期待する結果):
        let ids: Vec<&str> = snapshots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_events_arrive_in_command_order() {
        // テスト項目: 同じルームのイベントは処理順に届く
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let directory = RoomDirectory::new(pusher.clone());
        let (alice, mut alice_rx) = connect(&pusher).await;
        let (bob, mut bob_rx) = connect(&pusher).await;
        let r1 = room_id("r1");
        directory.dispatch_or_create(&r1, join(alice, "alice"));
        directory.dispatch_or_create(&r1, join(bob, "bob"));

        // when (操作):
        for _ in 0..3 {
            directory.dispatch(
                &r1,
                RoomCommand::Typing {
                    sender: alice,
                    username: "alice".to_string(),
                },
            );
            directory.dispatch(&r1, RoomCommand::StopTyping { sender: alice });
        }

        // then (期待する結果):
        assert_eq!(
            bob_rx.recv().await,
            Some(r#"{"event":"room_users","data":["alice","bob"]}"#.to_string())
        );
        for _ in 0..3 {
            assert_eq!(
                bob_rx.recv().await,
                Some(r#"{"event":"user_typing","data":"alice"}"#.to_string())
            );
            assert_eq!(
                bob_rx.recv().await,
                Some(r#"{"event":"user_stop_typing"}"#.to_string())
            );
        }
        // alice には参加者一覧の 2 通のみ
        assert!(alice_rx.recv().await.is_some());
        assert!(alice_rx.recv().await.is_some());
        assert!(alice_rx.try_recv().is_err());
    }
}
