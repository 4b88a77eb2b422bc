use serde::{Deserialize, Serialize};

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub username: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// JWT claims admitting one user to one room channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelClaims {
    pub room_id: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// Response structure for session creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub session_id: String, // The JWT token
    pub username: String,
    pub player_id: String,
}
