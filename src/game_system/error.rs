use thiserror::Error;

use crate::channel::ChannelJoinError;

/// Failures surfaced while setting up a session
///
/// Both are fatal for the session being set up. Whether to try again with a
/// different configuration is up to the caller.
#[derive(Debug, Error)]
pub enum GameSystemError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Channel join failed: {0}")]
    ChannelJoin(#[from] ChannelJoinError),
}

impl GameSystemError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        GameSystemError::Configuration(msg.into())
    }
}
