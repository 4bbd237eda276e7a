//! The task that owns a single room.
//!
//! Commands are applied strictly in arrival order and the resulting
//! deliveries are handed to the pusher before the next command is read, so
//! every member observes a room's events in the same order.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::domain::{Delivery, MessagePusher, Room, RoomCommand, RoomId, Timestamp};
use crate::infrastructure::dto::conversion::server_message;

use super::directory::RoomHandle;

pub(super) struct RoomActor {
    room: Room,
    generation: u64,
    commands: mpsc::UnboundedReceiver<RoomCommand>,
    pusher: Arc<dyn MessagePusher>,
    rooms: Weak<DashMap<RoomId, RoomHandle>>,
}

impl RoomActor {
    pub(super) fn new(
        room: Room,
        generation: u64,
        commands: mpsc::UnboundedReceiver<RoomCommand>,
        pusher: Arc<dyn MessagePusher>,
        rooms: Weak<DashMap<RoomId, RoomHandle>>,
    ) -> Self {
        Self {
            room,
            generation,
            commands,
            pusher,
            rooms,
        }
    }

    pub(super) async fn run(mut self) {
        tracing::info!("Room '{}' opened", self.room.id);

        while let Some(command) = self.commands.recv().await {
            self.handle(command).await;

            if self.room.is_empty() && self.try_close() {
                break;
            }
        }

        tracing::info!("Room '{}' closed", self.room.id);
    }

    /// Remove this room from the directory if it is still the registered
    /// instance and nothing is queued. Senders hold the directory entry while
    /// queueing, so an empty queue here means no command can be lost.
    fn try_close(&self) -> bool {
        let Some(rooms) = self.rooms.upgrade() else {
            return false;
        };
        rooms
            .remove_if(&self.room.id, |_, handle| {
                handle.generation == self.generation && self.commands.is_empty()
            })
            .is_some()
    }

    async fn handle(&mut self, command: RoomCommand) {
        let name = command.name();
        let result = match command {
            RoomCommand::Join { participant } => Ok(self.room.join(participant)),
            RoomCommand::Leave { connection_id } => Ok(self.room.leave(&connection_id)),
            RoomCommand::SendMessage { sender, message } => {
                self.room.send_message(&sender, message)
            }
            RoomCommand::MarkSeen {
                reporter,
                message_id,
            } => self.room.mark_seen(&reporter, message_id),
            RoomCommand::DeleteMessage {
                requester,
                message_id,
            } => self.room.delete_message(&requester, message_id),
            RoomCommand::Typing { sender, username } => self.room.typing(&sender, username),
            RoomCommand::StopTyping { sender } => self.room.stop_typing(&sender),
            RoomCommand::Invite { caller, from, kind } => {
                self.room.invite(&caller, from, kind, Timestamp::now())
            }
            RoomCommand::Accept { callee, reply } => self.room.accept_call(&callee, reply),
            RoomCommand::Reject { callee, reply } => self.room.reject_call(&callee, reply),
            RoomCommand::EndCall { requester } => self.room.end_call(&requester),
            RoomCommand::Signal { sender, signal } => self.room.relay_signal(&sender, signal),
            RoomCommand::Snapshot { reply } => {
                // 要求側が先に諦めていても問題ない
                let _ = reply.send(self.room.snapshot());
                Ok(Vec::new())
            }
        };

        match result {
            Ok(deliveries) => self.deliver(deliveries).await,
            Err(e) => {
                tracing::debug!("Room '{}' dropped '{}': {}", self.room.id, name, e);
            }
        }
    }

    async fn deliver(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let recipients = self.room.recipients(&delivery.audience);
            if recipients.is_empty() {
                continue;
            }

            let frame = match server_message(&self.room.id, delivery.event).to_json() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to serialize event for room '{}': {}", self.room.id, e);
                    continue;
                }
            };

            if let Err(e) = self.pusher.broadcast(recipients, &frame).await {
                tracing::warn!("Broadcast in room '{}' failed: {}", self.room.id, e);
            }
        }
    }
}
