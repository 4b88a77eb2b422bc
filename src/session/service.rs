use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    token::TokenConfig,
    types::{SessionClaims, SessionResponse},
};
use crate::shared::AppError;

/// Issues and checks session and channel tokens for the relay
#[derive(Clone)]
pub struct SessionService {
    token_config: TokenConfig,
}

impl SessionService {
    pub fn new(token_config: TokenConfig) -> Self {
        Self { token_config }
    }

    /// Creates a new session with a generated username and JWT token
    #[instrument(skip(self))]
    pub fn create_session(&self) -> Result<SessionResponse, AppError> {
        let player_id = Uuid::new_v4().to_string();
        let username = petname::Petnames::default().generate_one(2, "-");

        let session_id = self
            .token_config
            .create_session_token(&player_id, &username)?;

        info!(username = %username, player_id = %player_id, "Session created");

        Ok(SessionResponse {
            session_id,
            username,
            player_id,
        })
    }

    /// Validates a session token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.token_config.validate_session_token(token).map_err(|e| {
            warn!(error = %e, "Session token rejected");
            AppError::Unauthorized("Invalid or expired session".to_string())
        })
    }

    /// Issues a channel token for `room_id` to the holder of `claims`
    #[instrument(skip(self, claims), fields(username = %claims.username))]
    pub fn authorize_channel(
        &self,
        claims: &SessionClaims,
        room_id: &str,
    ) -> Result<String, AppError> {
        let token = self
            .token_config
            .create_channel_token(room_id, &claims.username)?;
        info!(room_id = %room_id, "Channel authorization issued");
        Ok(token)
    }

    /// Checks a channel token against the room it is being used for
    #[instrument(skip(self, token))]
    pub fn validate_channel(&self, token: &str, room_id: &str) -> Result<String, AppError> {
        let claims = self.token_config.validate_channel_token(token).map_err(|e| {
            warn!(error = %e, "Channel token rejected");
            AppError::Unauthorized("Invalid or expired channel authorization".to_string())
        })?;

        if claims.room_id != room_id {
            warn!(
                token_room = %claims.room_id,
                requested_room = %room_id,
                "Channel token used for a different room"
            );
            return Err(AppError::Unauthorized(
                "Channel authorization is for another room".to_string(),
            ));
        }

        Ok(claims.username)
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new(TokenConfig::new())
    }
}
