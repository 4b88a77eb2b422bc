// Library crate for the wizard multiplayer sync layer
// Gameplay uses the game_system facade; the relay binary uses relay and session

pub mod channel;
pub mod config;
pub mod event;
pub mod game_system;
pub mod relay;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use channel::{ChannelConnector, ChannelHandle, ChannelJoinError, ChannelMessage};
pub use config::{SessionConfig, SessionInfo, SessionKind, StartMode};
pub use event::{EventBus, EventHandler, EventName, GameEvent};
pub use game_system::{
    create_game_system, GameRecord, GameSystem, GameSystemError, LocalGameSystem, PlayerRoster,
    RemoteGameSystem, SessionServices,
};
pub use shared::{AppError, AppState};
