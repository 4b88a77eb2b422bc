use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ChannelConnector, ChannelHandle, ChannelJoinError, ChannelMessage, JoinedChannel};

struct Member {
    socket_id: String,
    sender: mpsc::UnboundedSender<ChannelMessage>,
}

#[derive(Default)]
struct HubState {
    // room_id -> members in join order
    rooms: HashMap<String, Vec<Member>>,
    // room_id -> member ids allowed to join
    private_rooms: HashMap<String, HashSet<String>>,
}

/// In-process room channels
///
/// Every process-local peer gets its own [`InMemoryConnector`] from the hub.
/// A broadcast reaches every other member of the same room.
#[derive(Clone, Default)]
pub struct InMemoryChannelHub {
    state: Arc<Mutex<HubState>>,
}

impl InMemoryChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connector acting on behalf of `member_id`
    pub fn connector(&self, member_id: impl Into<String>) -> InMemoryConnector {
        InMemoryConnector {
            hub: self.clone(),
            member_id: member_id.into(),
        }
    }

    /// Restricts `room_id` to the listed members
    pub fn make_private<I, S>(&self, room_id: &str, allowed: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().private_rooms.insert(
            room_id.to_string(),
            allowed.into_iter().map(Into::into).collect(),
        );
    }

    /// Number of joined members in `room_id`
    pub fn member_count(&self, room_id: &str) -> usize {
        self.state().rooms.get(room_id).map_or(0, Vec::len)
    }

    fn join_room(
        &self,
        room_id: &str,
        member_id: &str,
    ) -> Result<(String, mpsc::UnboundedReceiver<ChannelMessage>), ChannelJoinError> {
        let mut state = self.state();

        if let Some(allowed) = state.private_rooms.get(room_id) {
            if !allowed.contains(member_id) {
                warn!(
                    room_id = %room_id,
                    member_id = %member_id,
                    "Member not allowed in private room"
                );
                return Err(ChannelJoinError::Rejected(format!(
                    "{} is not allowed in room {}",
                    member_id, room_id
                )));
            }
        }

        let socket_id = Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();
        state
            .rooms
            .entry(room_id.to_string())
            .or_default()
            .push(Member {
                socket_id: socket_id.clone(),
                sender,
            });

        info!(
            room_id = %room_id,
            member_id = %member_id,
            socket_id = %socket_id,
            "Joined in-memory room"
        );
        Ok((socket_id, receiver))
    }

    fn broadcast_from(&self, room_id: &str, socket_id: &str, message: &ChannelMessage) {
        let mut state = self.state();
        let Some(members) = state.rooms.get_mut(room_id) else {
            debug!(room_id = %room_id, "Broadcast to unknown room dropped");
            return;
        };

        // Closed receivers are pruned on the way
        members.retain(|member| {
            if member.socket_id == socket_id {
                return true;
            }
            member.sender.send(message.clone()).is_ok()
        });

        debug!(
            room_id = %room_id,
            event = %message.event,
            receivers = members.len().saturating_sub(1),
            "In-memory broadcast"
        );
    }

    fn leave(&self, room_id: &str, socket_id: &str) {
        let mut state = self.state();
        if let Some(members) = state.rooms.get_mut(room_id) {
            members.retain(|member| member.socket_id != socket_id);
            if members.is_empty() {
                state.rooms.remove(room_id);
            }
        }
        debug!(room_id = %room_id, socket_id = %socket_id, "Left in-memory room");
    }
}

/// [`ChannelConnector`] bound to one member of an [`InMemoryChannelHub`]
#[derive(Clone)]
pub struct InMemoryConnector {
    hub: InMemoryChannelHub,
    member_id: String,
}

#[async_trait]
impl ChannelConnector for InMemoryConnector {
    async fn join(&self, room_id: &str) -> Result<JoinedChannel, ChannelJoinError> {
        let (socket_id, inbound) = self.hub.join_room(room_id, &self.member_id)?;

        Ok(JoinedChannel {
            handle: Arc::new(InMemoryChannelHandle {
                hub: self.hub.clone(),
                room_id: room_id.to_string(),
                socket_id,
            }),
            inbound,
        })
    }
}

struct InMemoryChannelHandle {
    hub: InMemoryChannelHub,
    room_id: String,
    socket_id: String,
}

impl ChannelHandle for InMemoryChannelHandle {
    fn broadcast(&self, message: &ChannelMessage) {
        self.hub.broadcast_from(&self.room_id, &self.socket_id, message);
    }

    fn room_id(&self) -> &str {
        &self.room_id
    }
}

impl Drop for InMemoryChannelHandle {
    fn drop(&mut self) {
        self.hub.leave(&self.room_id, &self.socket_id);
    }
}
