// Room-scoped broadcast transport used by the networked game system
//
// The game system only sees the two traits below. Concrete transports live in
// the submodules: an in-process hub for local play and tests, and a websocket
// client that talks to the relay server.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

// Public API - what other modules can use
pub use auth::{ChannelAuthRequest, ChannelAuthResponse, ChannelAuthorizer, HttpChannelAuthorizer};
pub use memory::{InMemoryChannelHub, InMemoryConnector};
pub use messages::{ChannelMessage, CreatePlayerPayload, MessageMeta};
pub use websocket::WebSocketConnector;

// Internal modules
mod auth;
mod memory;
mod messages;
mod websocket;

/// Errors that can occur while joining a room channel
#[derive(Debug, Error)]
pub enum ChannelJoinError {
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Join rejected: {0}")]
    Rejected(String),
}

/// Sending side of a joined room channel
pub trait ChannelHandle: Send + Sync {
    /// Best-effort send to every other member of the room
    ///
    /// There is no acknowledgment and no retry; failures are logged by the
    /// transport and otherwise dropped.
    fn broadcast(&self, message: &ChannelMessage);

    fn room_id(&self) -> &str;
}

/// A joined channel: the sending handle plus the inbound message stream
///
/// Messages from one sender arrive in the order they were sent. There is
/// no ordering across senders.
pub struct JoinedChannel {
    pub handle: Arc<dyn ChannelHandle>,
    pub inbound: mpsc::UnboundedReceiver<ChannelMessage>,
}

/// Joins room channels
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn join(&self, room_id: &str) -> Result<JoinedChannel, ChannelJoinError>;
}

/// Name under which a room's channel is authorized
pub fn channel_name(room_id: &str) -> String {
    format!("room.{}", room_id)
}

/// Inverse of [`channel_name`]
pub fn room_from_channel_name(channel_name: &str) -> Option<&str> {
    channel_name
        .strip_prefix("room.")
        .filter(|room_id| !room_id.is_empty())
}
