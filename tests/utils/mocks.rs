use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use wizard_sync::{
    channel::JoinedChannel, ChannelConnector, ChannelHandle, ChannelJoinError, ChannelMessage,
    EventName,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Channel handle that keeps every broadcast instead of sending it
pub struct RecordingChannel {
    room_id: String,
    sent: Mutex<Vec<ChannelMessage>>,
}

#[allow(dead_code)]
impl RecordingChannel {
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<ChannelMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_names(&self) -> Vec<EventName> {
        self.sent().iter().map(|m| m.event).collect()
    }
}

impl ChannelHandle for RecordingChannel {
    fn broadcast(&self, message: &ChannelMessage) {
        self.sent.lock().unwrap().push(message.clone());
    }

    fn room_id(&self) -> &str {
        &self.room_id
    }
}

/// Connector handing out a [`RecordingChannel`] and a scriptable inbound stream
pub struct RecordingConnector {
    pub channel: Arc<RecordingChannel>,
    inbound: Mutex<Option<mpsc::UnboundedSender<ChannelMessage>>>,
    joined_rooms: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingConnector {
    pub fn new(room_id: &str) -> Self {
        Self {
            channel: Arc::new(RecordingChannel::new(room_id)),
            inbound: Mutex::new(None),
            joined_rooms: Mutex::new(Vec::new()),
        }
    }

    /// Feeds a message to the joined game system as if a peer sent it
    pub fn push_inbound(&self, message: ChannelMessage) {
        if let Some(sender) = self.inbound.lock().unwrap().as_ref() {
            sender.send(message).unwrap();
        }
    }

    pub fn joined_rooms(&self) -> Vec<String> {
        self.joined_rooms.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelConnector for RecordingConnector {
    async fn join(&self, room_id: &str) -> Result<JoinedChannel, ChannelJoinError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.inbound.lock().unwrap() = Some(sender);
        self.joined_rooms.lock().unwrap().push(room_id.to_string());
        Ok(JoinedChannel {
            handle: self.channel.clone(),
            inbound: receiver,
        })
    }
}

/// Connector whose joins always fail
pub struct FailingConnector;

#[async_trait]
impl ChannelConnector for FailingConnector {
    async fn join(&self, room_id: &str) -> Result<JoinedChannel, ChannelJoinError> {
        Err(ChannelJoinError::Connection(format!(
            "relay unreachable for room {}",
            room_id
        )))
    }
}
