use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

struct RoomMember {
    username: String,
    sender: mpsc::UnboundedSender<String>,
}

/// Tracks which sockets are joined to which room
///
/// Rooms come into existence with their first member and disappear with
/// their last.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    // room_id -> socket_id -> member
    rooms: Arc<RwLock<HashMap<String, HashMap<String, RoomMember>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn join(
        &self,
        room_id: &str,
        socket_id: &str,
        username: &str,
        sender: mpsc::UnboundedSender<String>,
    ) {
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(room_id.to_string()).or_default();
        members.insert(
            socket_id.to_string(),
            RoomMember {
                username: username.to_string(),
                sender,
            },
        );
        debug!(
            room_id = %room_id,
            socket_id = %socket_id,
            members = members.len(),
            "Socket joined room"
        );
    }

    pub async fn leave(&self, room_id: &str, socket_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_id) {
            if let Some(member) = members.remove(socket_id) {
                debug!(room_id = %room_id, username = %member.username, "Socket left room");
            }
            if members.is_empty() {
                rooms.remove(room_id);
                debug!(room_id = %room_id, "Room closed");
            }
        }
    }

    /// Forwards `message` to every member of `room_id` except `from_socket`
    ///
    /// Returns how many members the message was handed to.
    pub async fn broadcast_except(&self, room_id: &str, from_socket: &str, message: &str) -> usize {
        let rooms = self.rooms.read().await;
        let Some(members) = rooms.get(room_id) else {
            return 0;
        };

        members
            .iter()
            .filter(|(socket_id, _)| socket_id.as_str() != from_socket)
            .filter(|(_, member)| member.sender.send(message.to_string()).is_ok())
            .count()
    }

    pub async fn member_count(&self, room_id: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map_or(0, HashMap::len)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
