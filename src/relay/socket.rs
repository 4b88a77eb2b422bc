use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Text-frame view of a relay socket
#[async_trait]
pub trait TextSocket: Send {
    /// Send one text frame to the peer
    async fn send_text(&mut self, message: String) -> Result<(), SocketError>;

    /// Next text frame from the peer, `None` once the peer is gone
    async fn next_text(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for incoming text frames from one socket
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, socket_id: &str, room_id: &str, message: String);
}

#[derive(Debug)]
pub enum SocketError {
    SendFailed(String),
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl TextSocket for WebSocket {
    async fn send_text(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue, // Ignore binary/ping/pong
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
                None => return Ok(None), // Connection closed
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Connection represents one socket joined to a room
///
/// Outbound messages come from the room registry through `outbound_receiver`;
/// inbound frames are handed to the message handler.
pub struct Connection {
    pub socket_id: String,
    pub room_id: String,
    socket: Box<dyn TextSocket>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        socket_id: String,
        room_id: String,
        socket: Box<dyn TextSocket>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            socket_id,
            room_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Run the connection - handles both sending and receiving until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.socket.send_text(message).await?
                        }
                        None => break, // Channel closed, disconnect
                    }
                }

                msg = self.socket.next_text() => {
                    match msg {
                        Ok(Some(message)) => {
                            self.message_handler
                                .handle_message(&self.socket_id, &self.room_id, message)
                                .await;
                        }
                        Ok(None) => break, // Peer disconnected
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        let _ = self.socket.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedSocket {
        incoming: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TextSocket for ScriptedSocket {
        async fn send_text(&mut self, message: String) -> Result<(), SocketError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
            match self.incoming.pop_front() {
                Some(message) => Ok(Some(message)),
                // Stay open so outbound traffic can drain
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            Ok(())
        }
    }

    struct RecordingHandler {
        seen: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle_message(&self, socket_id: &str, room_id: &str, message: String) {
            self.seen
                .lock()
                .unwrap()
                .push((socket_id.to_string(), room_id.to_string(), message));
        }
    }

    #[tokio::test]
    async fn test_connection_routes_both_directions() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let socket = ScriptedSocket {
            incoming: VecDeque::from(vec!["from-peer".to_string()]),
            sent: sent.clone(),
        };
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });
        let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel();

        let connection = Connection::new(
            "s1".to_string(),
            "room".to_string(),
            Box::new(socket),
            outbound_receiver,
            handler.clone(),
        );

        outbound_sender.send("to-peer".to_string()).unwrap();
        let task = tokio::spawn(connection.run());
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        drop(outbound_sender);

        task.await.unwrap().unwrap();

        assert_eq!(*sent.lock().unwrap(), vec!["to-peer".to_string()]);
        assert_eq!(
            *handler.seen.lock().unwrap(),
            vec![(
                "s1".to_string(),
                "room".to_string(),
                "from-peer".to_string()
            )]
        );
    }
}
