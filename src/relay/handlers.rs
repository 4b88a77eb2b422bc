use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::rooms::RoomRegistry;
use super::socket::{Connection, MessageHandler};
use crate::channel::ChannelMessage;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct SocketParams {
    /// Channel token from `POST /broadcasting/auth`
    pub auth: String,
}

/// Forwards every well-formed frame to the rest of the room
pub struct RelayMessageHandler {
    rooms: RoomRegistry,
}

impl RelayMessageHandler {
    pub fn new(rooms: RoomRegistry) -> Self {
        Self { rooms }
    }
}

#[async_trait]
impl MessageHandler for RelayMessageHandler {
    async fn handle_message(&self, socket_id: &str, room_id: &str, message: String) {
        match serde_json::from_str::<ChannelMessage>(&message) {
            Ok(parsed) => {
                let delivered = self
                    .rooms
                    .broadcast_except(room_id, socket_id, &message)
                    .await;
                debug!(
                    room_id = %room_id,
                    socket_id = %socket_id,
                    event = %parsed.event,
                    receivers = delivered,
                    "Relayed message"
                );
            }
            Err(e) => {
                warn!(
                    room_id = %room_id,
                    socket_id = %socket_id,
                    error = %e,
                    "Dropping malformed channel message"
                );
            }
        }
    }
}

/// WebSocket endpoint joining the caller to a room channel
/// GET /ws/:room_id?auth=<channel token>
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    Query(params): Query<SocketParams>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    info!(room_id = %room_id, "WebSocket connection requested");

    let username = app_state
        .session_service
        .validate_channel(&params.auth, &room_id)?;

    info!(
        room_id = %room_id,
        username = %username,
        "Channel authorization accepted, upgrading"
    );

    Ok(ws.on_upgrade(move |socket| {
        handle_websocket_connection(socket, room_id, username, app_state.rooms)
    }))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    room_id: String,
    username: String,
    rooms: RoomRegistry,
) {
    let socket_id = Uuid::new_v4().to_string();
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    rooms
        .join(&room_id, &socket_id, &username, outbound_sender)
        .await;

    info!(
        room_id = %room_id,
        username = %username,
        socket_id = %socket_id,
        "WebSocket connection established"
    );

    let connection = Connection::new(
        socket_id.clone(),
        room_id.clone(),
        Box::new(socket),
        outbound_receiver,
        Arc::new(RelayMessageHandler::new(rooms.clone())),
    );

    match connection.run().await {
        Ok(()) => {
            info!(
                room_id = %room_id,
                username = %username,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                room_id = %room_id,
                username = %username,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    rooms.leave(&room_id, &socket_id).await;
}
