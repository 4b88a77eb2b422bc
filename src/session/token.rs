use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use super::types::{ChannelClaims, SessionClaims};
use crate::shared::AppError;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Signs and checks the relay's two token kinds
///
/// Session tokens identify a player for a long time. Channel tokens admit
/// one player to one room and expire within minutes.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
    pub channel_token_minutes: i64,
}

impl TokenConfig {
    /// Reads `JWT_SECRET`, `SESSION_EXPIRATION_DAYS` and `CHANNEL_TOKEN_MINUTES`
    pub fn new() -> Self {
        Self {
            secret: env_or("JWT_SECRET", "wizard-sync-dev-secret".to_string()),
            expiration_days: env_or("SESSION_EXPIRATION_DAYS", 365),
            channel_token_minutes: env_or("CHANNEL_TOKEN_MINUTES", 10),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Creates a long-lived session token for a player
    #[instrument(skip(self))]
    pub fn create_session_token(
        &self,
        session_id: &str,
        username: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating session token with expiration"
        );

        self.encode_claims(&SessionClaims {
            session_id: session_id.to_string(),
            username: username.to_string(),
            exp,
            iat: now.timestamp() as usize,
        })
    }

    /// Validates a session token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_session_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims: SessionClaims = self.decode_claims(token)?;
        debug!(
            username = %claims.username,
            session_id = %claims.session_id,
            "Session token decoded successfully"
        );
        Ok(claims)
    }

    /// Creates a short-lived token admitting `username` to one room channel
    #[instrument(skip(self))]
    pub fn create_channel_token(&self, room_id: &str, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.channel_token_minutes)).timestamp() as usize;

        self.encode_claims(&ChannelClaims {
            room_id: room_id.to_string(),
            username: username.to_string(),
            exp,
            iat: now.timestamp() as usize,
        })
    }

    /// Validates a channel token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_channel_token(&self, token: &str) -> Result<ChannelClaims, AppError> {
        let claims: ChannelClaims = self.decode_claims(token)?;
        debug!(
            username = %claims.username,
            room_id = %claims.room_id,
            "Channel token decoded successfully"
        );
        Ok(claims)
    }

    fn encode_claims<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, AppError> {
        decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}
