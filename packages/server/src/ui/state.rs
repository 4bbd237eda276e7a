//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{ConnectionRegistry, MessagePusher, RoomDispatcher},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryConnectionRegistry,
        room::RoomDirectory,
    },
    usecase::{
        CallUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, RelaySignalUseCase,
        SendMessageUseCase, TypingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    pub call_usecase: Arc<CallUseCase>,
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Origin WebSocket upgrades must come from, if restricted.
    pub allowed_origin: Option<String>,
}

impl AppState {
    /// Wire the in-memory implementations together.
    pub fn from_config(config: &ServerConfig) -> Self {
        // 1. Infrastructure
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::default());
        let registry: Arc<dyn ConnectionRegistry> =
            Arc::new(InMemoryConnectionRegistry::new(config.max_connections));
        let rooms: Arc<dyn RoomDispatcher> = Arc::new(RoomDirectory::with_ledger_capacity(
            message_pusher.clone(),
            config.message_ledger_capacity,
        ));

        // 2. UseCases
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher,
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(registry, rooms.clone())),
            send_message_usecase: Arc::new(SendMessageUseCase::new(rooms.clone())),
            typing_usecase: Arc::new(TypingUseCase::new(rooms.clone())),
            call_usecase: Arc::new(CallUseCase::new(rooms.clone())),
            relay_signal_usecase: Arc::new(RelaySignalUseCase::new(rooms.clone())),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(rooms.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(rooms)),
            allowed_origin: config.allowed_origin.clone(),
        }
    }
}
