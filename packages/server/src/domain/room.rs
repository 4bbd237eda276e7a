//! Room aggregate.
//!
//! A `Room` is plain data plus transition methods. Each method validates,
//! mutates, and returns the deliveries the caller must fan out, in order.
//! Nothing here does I/O; serialization of access is the owner's job.

use super::{
    call::{CallCoordinator, CallKind, CallState},
    command::RoomSnapshot,
    delivery::{DEFAULT_LEDGER_CAPACITY, MessageLedger},
    entity::{ChatMessage, DeliveryStatus, Participant},
    error::{CallError, RoomError},
    event::{Audience, CallReply, Delivery, RoomEvent, Signal},
    value_object::{ConnectionId, DisplayName, MessageId, RoomId, Timestamp},
};

#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// Join order.
    participants: Vec<Participant>,
    call: CallCoordinator,
    ledger: MessageLedger,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self::with_ledger_capacity(id, created_at, DEFAULT_LEDGER_CAPACITY)
    }

    pub fn with_ledger_capacity(id: RoomId, created_at: Timestamp, ledger_capacity: usize) -> Self {
        Self {
            id,
            created_at,
            participants: Vec::new(),
            call: CallCoordinator::new(),
            ledger: MessageLedger::with_capacity(ledger_capacity),
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn member_names(&self) -> Vec<DisplayName> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    pub fn participant(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection_id == *connection_id)
    }

    pub fn is_participant(&self, connection_id: &ConnectionId) -> bool {
        self.participant(connection_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn call_state(&self) -> &CallState {
        self.call.state()
    }

    pub fn ledger(&self) -> &MessageLedger {
        &self.ledger
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            participants: self.participants.clone(),
            call: self.call.state().clone(),
        }
    }

    /// Connections an audience resolves to right now, in join order.
    pub fn recipients(&self, audience: &Audience) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .map(|p| p.connection_id)
            .filter(|id| match audience {
                Audience::Everyone => true,
                Audience::EveryoneExcept(excluded) => id != excluded,
            })
            .collect()
    }

    /// Add a participant, evicting any entry with the same connection or the
    /// same display name (last join wins).
    pub fn join(&mut self, participant: Participant) -> Vec<Delivery> {
        let joining = participant.connection_id;
        let evicted: Vec<ConnectionId> = self
            .participants
            .iter()
            .filter(|p| p.connection_id != joining && p.name == participant.name)
            .map(|p| p.connection_id)
            .collect();

        self.participants
            .retain(|p| p.connection_id != joining && p.name != participant.name);
        self.participants.push(participant);

        let mut deliveries = Vec::new();
        for connection_id in evicted {
            if self
                .call
                .participant_left(&connection_id, self.participants.len())
            {
                deliveries.push(Delivery::to_everyone(RoomEvent::CallEnded));
            }
        }
        deliveries.push(self.members_delivery());
        deliveries
    }

    /// Remove a participant. Unknown connections are a no-op.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Vec<Delivery> {
        let before = self.participants.len();
        self.participants
            .retain(|p| p.connection_id != *connection_id);
        if self.participants.len() == before {
            return Vec::new();
        }

        let mut deliveries = Vec::new();
        if self
            .call
            .participant_left(connection_id, self.participants.len())
        {
            deliveries.push(Delivery::to_everyone(RoomEvent::CallEnded));
        }
        deliveries.push(self.members_delivery());
        deliveries
    }

    /// Relay a chat message to the whole room, sender included, as `sent`.
    pub fn send_message(
        &mut self,
        sender: &ConnectionId,
        mut message: ChatMessage,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(sender)?;
        if message.room != self.id {
            return Err(RoomError::RoomMismatch {
                room: self.id.as_str().to_string(),
                message_room: message.room.as_str().to_string(),
            });
        }

        message.status = DeliveryStatus::Sent;
        self.ledger
            .record_sent(message.id.clone(), message.author.clone());
        Ok(vec![Delivery::to_everyone(RoomEvent::MessageReceived(
            message,
        ))])
    }

    /// Tell everyone but the reporter that a message was seen.
    pub fn mark_seen(
        &mut self,
        reporter: &ConnectionId,
        message_id: MessageId,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(reporter)?;
        self.ledger.mark_seen(&message_id)?;
        Ok(vec![Delivery::to_others(
            *reporter,
            RoomEvent::MessageSeen(message_id),
        )])
    }

    /// Remove a message from every client's view.
    pub fn delete_message(
        &mut self,
        requester: &ConnectionId,
        message_id: MessageId,
    ) -> Result<Vec<Delivery>, RoomError> {
        let name = self.ensure_participant(requester)?.name.clone();
        self.ledger.delete(&message_id, &name)?;
        Ok(vec![Delivery::to_everyone(RoomEvent::MessageDeleted(
            message_id,
        ))])
    }

    pub fn typing(
        &self,
        sender: &ConnectionId,
        username: String,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(sender)?;
        Ok(vec![Delivery::to_others(
            *sender,
            RoomEvent::UserTyping(username),
        )])
    }

    pub fn stop_typing(&self, sender: &ConnectionId) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(sender)?;
        Ok(vec![Delivery::to_others(*sender, RoomEvent::UserStopTyping)])
    }

    pub fn invite(
        &mut self,
        caller: &ConnectionId,
        from: String,
        kind: CallKind,
        at: Timestamp,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(caller)?;
        self.call.invite(*caller, from.clone(), kind, at)?;
        Ok(vec![Delivery::to_others(
            *caller,
            RoomEvent::IncomingCall { from, kind },
        )])
    }

    pub fn accept_call(
        &mut self,
        callee: &ConnectionId,
        mut reply: CallReply,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(callee)?;
        let kind = self.call.accept(*callee)?;
        reply.kind = Some(reply.kind.unwrap_or(kind));
        Ok(vec![Delivery::to_others(
            *callee,
            RoomEvent::CallAccepted(reply),
        )])
    }

    pub fn reject_call(
        &mut self,
        callee: &ConnectionId,
        reply: CallReply,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(callee)?;
        self.call.reject()?;
        Ok(vec![Delivery::to_others(
            *callee,
            RoomEvent::CallRejected(reply),
        )])
    }

    pub fn end_call(&mut self, requester: &ConnectionId) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(requester)?;
        self.call.end()?;
        Ok(vec![Delivery::to_everyone(RoomEvent::CallEnded)])
    }

    /// Forward signaling metadata to everyone but the sender while a call
    /// is ringing or active.
    pub fn relay_signal(
        &self,
        sender: &ConnectionId,
        signal: Signal,
    ) -> Result<Vec<Delivery>, RoomError> {
        self.ensure_participant(sender)?;
        if self.call.is_idle() {
            return Err(CallError::NoCallInProgress.into());
        }
        Ok(vec![Delivery::to_others(*sender, RoomEvent::Signal(signal))])
    }

    fn members_delivery(&self) -> Delivery {
        Delivery::to_everyone(RoomEvent::Members(self.member_names()))
    }

    fn ensure_participant(&self, connection_id: &ConnectionId) -> Result<&Participant, RoomError> {
        self.participant(connection_id)
            .ok_or_else(|| RoomError::NotAParticipant(connection_id.to_string()))
    }
}
