use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{channel_name, ChannelJoinError};
use crate::session::CredentialStore;

/// Body of `POST /broadcasting/auth`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelAuthRequest {
    pub channel_name: String,
}

/// Response of `POST /broadcasting/auth`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelAuthResponse {
    /// Short-lived token that admits the bearer to one room channel
    pub auth: String,
}

/// Obtains permission to join a room channel
#[async_trait]
pub trait ChannelAuthorizer: Send + Sync {
    async fn authorize(&self, room_id: &str) -> Result<String, ChannelJoinError>;
}

/// Authorizes against the relay's HTTP endpoint with the stored session token
pub struct HttpChannelAuthorizer {
    relay_url: String,
    http_client: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpChannelAuthorizer {
    pub fn new(relay_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            relay_url: relay_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            credentials,
        }
    }
}

#[async_trait]
impl ChannelAuthorizer for HttpChannelAuthorizer {
    #[instrument(skip(self))]
    async fn authorize(&self, room_id: &str) -> Result<String, ChannelJoinError> {
        let token = self.credentials.session_token().ok_or_else(|| {
            warn!("No session token available for channel authorization");
            ChannelJoinError::Authorization("No session token".to_string())
        })?;

        let response = self
            .http_client
            .post(format!("{}/broadcasting/auth", self.relay_url))
            .bearer_auth(token)
            .json(&ChannelAuthRequest {
                channel_name: channel_name(room_id),
            })
            .send()
            .await
            .map_err(|e| ChannelJoinError::Authorization(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(room_id = %room_id, status = %status, "Relay refused channel authorization");
            return Err(ChannelJoinError::Authorization(format!(
                "Relay refused authorization with status {}",
                status
            )));
        }

        let body: ChannelAuthResponse = response
            .json()
            .await
            .map_err(|e| ChannelJoinError::Authorization(e.to_string()))?;

        debug!(room_id = %room_id, "Channel authorization granted");
        Ok(body.auth)
    }
}
