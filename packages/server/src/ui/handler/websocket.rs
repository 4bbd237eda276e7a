//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ChatMessage, ConnectionId, OpaquePayload, Signal, SignalKind, ValueObjectError},
    infrastructure::dto::websocket::{ClientMessage, SignalPayload},
    ui::state::AppState,
    usecase::{ConnectError, JoinRoomError, RoomCommandError},
};

/// Why a parsed client event could not be carried out.
#[derive(Debug, Error)]
enum EventError {
    #[error(transparent)]
    InvalidMessage(#[from] ValueObjectError),

    #[error(transparent)]
    Join(#[from] JoinRoomError),

    #[error(transparent)]
    Room(#[from] RoomCommandError),
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    if !origin_allowed(&headers, state.allowed_origin.as_deref()) {
        tracing::warn!(
            "Rejected WebSocket upgrade from origin {:?}",
            headers.get(ORIGIN)
        );
        return Err(StatusCode::FORBIDDEN);
    }

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();

    let connection = match state.connect_participant_usecase.execute(tx).await {
        Ok(connection) => connection,
        Err(ConnectError::CapacityExceeded(limit)) => {
            tracing::warn!("Connection limit of {} reached, rejecting upgrade", limit);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Err(e @ ConnectError::Registry(_)) => {
            tracing::error!("Failed to admit connection: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let connection_id = connection.id;
    tracing::debug!("Connection '{}' accepted", connection_id);

    let cleanup_state = state.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade for '{}' failed: {}", connection_id, e);
            tokio::spawn(async move {
                cleanup_state
                    .disconnect_participant_usecase
                    .execute(&connection_id)
                    .await;
            });
        })
        .on_upgrade(move |socket| handle_socket(socket, state, connection_id, rx)))
}

/// A missing `Origin` header (non-browser client) is always admitted.
fn origin_allowed(headers: &HeaderMap, allowed_origin: Option<&str>) -> bool {
    let Some(allowed) = allowed_origin else {
        return true;
    };
    match headers.get(ORIGIN) {
        None => true,
        Some(origin) => origin.to_str().is_ok_and(|origin| origin == allowed),
    }
}

/// Spawns a task that drains the connection's outbound queue into the socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();
    let state_clone = state.clone();

    // Spawn a task to receive frames from this connection
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, connection_id, text.as_str()).await;
                }
                Message::Binary(_) => {
                    tracing::warn!("Ignoring binary frame from '{}'", connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let send_task = pusher_loop(rx, sender);
    wait_for_either(recv_task, send_task).await;

    state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await;
    tracing::debug!("Connection '{}' disconnected", connection_id);
}

/// Wait until one of the tasks completes, then abort the other and wait
/// until it has stopped.
async fn wait_for_either(mut first: JoinHandle<()>, mut second: JoinHandle<()>) {
    tokio::select! {
        _ = &mut first => {
            second.abort();
            let _ = second.await;
        }
        _ = &mut second => {
            first.abort();
            let _ = first.await;
        }
    }
}

async fn handle_text(state: &AppState, connection_id: ConnectionId, text: &str) {
    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Dropped frame from '{}': {}", connection_id, e);
            return;
        }
    };

    let event = message.event_name();
    tracing::debug!("Received '{}' from '{}'", event, connection_id);

    match handle_event(state, connection_id, message).await {
        Ok(()) => {}
        Err(EventError::Room(e @ RoomCommandError::RoomNotFound(_))) => {
            tracing::debug!("Dropped '{}' from '{}': {}", event, connection_id, e);
        }
        Err(e) => {
            tracing::warn!("Dropped '{}' from '{}': {}", event, connection_id, e);
        }
    }
}

async fn handle_event(
    state: &AppState,
    connection_id: ConnectionId,
    message: ClientMessage,
) -> Result<(), EventError> {
    match message {
        ClientMessage::JoinRoom(payload) => {
            state
                .join_room_usecase
                .execute(connection_id, payload.room, payload.username)
                .await?;
        }
        ClientMessage::SendMessage(payload) => {
            // DTO から Domain Model への変換
            let message = ChatMessage::try_from(payload)?;
            state.send_message_usecase.send(connection_id, message)?;
        }
        ClientMessage::MessageSeen(payload) => {
            state
                .send_message_usecase
                .mark_seen(connection_id, payload.room, payload.message_id)?;
        }
        ClientMessage::DeleteMessage(payload) => {
            state
                .send_message_usecase
                .delete(connection_id, payload.room, payload.message_id)?;
        }
        ClientMessage::Typing(payload) => {
            state
                .typing_usecase
                .typing(connection_id, payload.room, payload.username)?;
        }
        ClientMessage::StopTyping(payload) => {
            state
                .typing_usecase
                .stop_typing(connection_id, payload.room().to_string())?;
        }
        ClientMessage::CallUser(payload) => {
            state
                .call_usecase
                .invite(connection_id, payload.room, payload.from, payload.kind)?;
        }
        ClientMessage::AcceptCall(payload) => {
            let room = payload.room.clone();
            state
                .call_usecase
                .accept(connection_id, room, payload.into())?;
        }
        ClientMessage::RejectCall(payload) => {
            let room = payload.room.clone();
            state
                .call_usecase
                .reject(connection_id, room, payload.into())?;
        }
        ClientMessage::EndCall(payload) => {
            state.call_usecase.end(connection_id, payload.room)?;
        }
        ClientMessage::WebrtcOffer(payload) => {
            relay(state, connection_id, SignalKind::Offer, payload)?;
        }
        ClientMessage::WebrtcAnswer(payload) => {
            relay(state, connection_id, SignalKind::Answer, payload)?;
        }
        ClientMessage::IceCandidate(payload) => {
            relay(state, connection_id, SignalKind::IceCandidate, payload)?;
        }
    }
    Ok(())
}

fn relay(
    state: &AppState,
    connection_id: ConnectionId,
    kind: SignalKind,
    payload: SignalPayload,
) -> Result<(), RoomCommandError> {
    let signal = Signal {
        kind,
        payload: OpaquePayload::new(payload.raw),
    };
    state
        .relay_signal_usecase
        .execute(connection_id, payload.room, signal)
}
