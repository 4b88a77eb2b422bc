use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, instrument, warn};

use super::{
    ChannelAuthorizer, ChannelConnector, ChannelHandle, ChannelJoinError, ChannelMessage,
    JoinedChannel,
};

/// Joins room channels on the relay server over a websocket
pub struct WebSocketConnector {
    relay_url: String,
    authorizer: Arc<dyn ChannelAuthorizer>,
}

impl WebSocketConnector {
    /// `relay_url` is the relay's HTTP base url, e.g. `http://localhost:3000`
    pub fn new(relay_url: impl Into<String>, authorizer: Arc<dyn ChannelAuthorizer>) -> Self {
        Self {
            relay_url: relay_url.into().trim_end_matches('/').to_string(),
            authorizer,
        }
    }

    fn socket_url(&self, room_id: &str, auth: &str) -> String {
        let base = if let Some(rest) = self.relay_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.relay_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.relay_url.clone()
        };
        format!("{}/ws/{}?auth={}", base, room_id, auth)
    }
}

#[async_trait]
impl ChannelConnector for WebSocketConnector {
    #[instrument(skip(self))]
    async fn join(&self, room_id: &str) -> Result<JoinedChannel, ChannelJoinError> {
        let auth = self.authorizer.authorize(room_id).await?;
        let url = self.socket_url(room_id, &auth);

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| ChannelJoinError::Connection(e.to_string()))?;
        info!(room_id = %room_id, "Connected to relay");

        let (mut sink, mut source) = stream.split();
        let (outbound_sender, mut outbound_receiver) = mpsc::unbounded_channel::<String>();
        let (inbound_sender, inbound_receiver) = mpsc::unbounded_channel::<ChannelMessage>();

        // Writer: ends when the handle is dropped
        let writer_room = room_id.to_string();
        tokio::spawn(async move {
            while let Some(text) = outbound_receiver.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!(room_id = %writer_room, error = %e, "Relay send failed");
                    break;
                }
            }
            let _ = sink.close().await;
            debug!(room_id = %writer_room, "Relay writer stopped");
        });

        // Reader: ends when the relay closes or nobody listens anymore
        let reader_room = room_id.to_string();
        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ChannelMessage>(&text) {
                        Ok(message) => {
                            if inbound_sender.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(
                                room_id = %reader_room,
                                error = %e,
                                "Dropping unrecognized relay message"
                            );
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {} // Ignore binary/ping/pong
                    Err(e) => {
                        warn!(room_id = %reader_room, error = %e, "Relay receive failed");
                        break;
                    }
                }
            }
            info!(room_id = %reader_room, "Relay connection closed");
        });

        Ok(JoinedChannel {
            handle: Arc::new(WebSocketChannelHandle {
                room_id: room_id.to_string(),
                outbound: outbound_sender,
            }),
            inbound: inbound_receiver,
        })
    }
}

struct WebSocketChannelHandle {
    room_id: String,
    outbound: mpsc::UnboundedSender<String>,
}

impl ChannelHandle for WebSocketChannelHandle {
    fn broadcast(&self, message: &ChannelMessage) {
        match serde_json::to_string(message) {
            Ok(text) => {
                if self.outbound.send(text).is_err() {
                    warn!(
                        room_id = %self.room_id,
                        event = %message.event,
                        "Relay connection gone, message dropped"
                    );
                }
            }
            Err(e) => {
                warn!(room_id = %self.room_id, error = %e, "Failed to encode channel message");
            }
        }
    }

    fn room_id(&self) -> &str {
        &self.room_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAuthorizer;

    #[async_trait]
    impl ChannelAuthorizer for FixedAuthorizer {
        async fn authorize(&self, _room_id: &str) -> Result<String, ChannelJoinError> {
            Ok("token".to_string())
        }
    }

    struct RefusingAuthorizer;

    #[async_trait]
    impl ChannelAuthorizer for RefusingAuthorizer {
        async fn authorize(&self, _room_id: &str) -> Result<String, ChannelJoinError> {
            Err(ChannelJoinError::Authorization("denied".to_string()))
        }
    }

    #[test]
    fn test_socket_url_switches_scheme() {
        let connector =
            WebSocketConnector::new("http://localhost:3000/", Arc::new(FixedAuthorizer));
        assert_eq!(
            connector.socket_url("ABC", "t0k"),
            "ws://localhost:3000/ws/ABC?auth=t0k"
        );

        let connector = WebSocketConnector::new("https://relay.example", Arc::new(FixedAuthorizer));
        assert_eq!(
            connector.socket_url("ABC", "t0k"),
            "wss://relay.example/ws/ABC?auth=t0k"
        );
    }

    #[tokio::test]
    async fn test_authorization_failure_is_surfaced() {
        let connector = WebSocketConnector::new("http://127.0.0.1:9", Arc::new(RefusingAuthorizer));
        let result = connector.join("ABC").await;
        assert!(matches!(result, Err(ChannelJoinError::Authorization(_))));
    }
}
