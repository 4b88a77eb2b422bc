// Game system facade
//
// Gameplay code talks to one `GameSystem` per session and never learns
// whether its peers share the process or sit behind a room channel.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::channel::ChannelConnector;
use crate::config::{SessionConfig, SessionInfo, SessionKind};
use crate::event::{EventBus, InputEvent};

// Public API - what other modules can use
pub use buff::{BuffAggregator, PlayerRoster, Roster};
pub use error::GameSystemError;
pub use local::LocalGameSystem;
pub use remote::RemoteGameSystem;
pub use replay::{ReplayBuffer, ReplayEntry};

// Internal modules
mod buff;
mod error;
mod local;
mod remote;
mod replay;

/// End-of-run summary handed over by gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub level: u32,
    pub personal_coin: i64,
}

/// Session-scoped event facade
///
/// Emit operations return nothing: delivery to subscribers is synchronous
/// and network delivery is best effort.
pub trait GameSystem: Send + Sync {
    /// The bus gameplay subscribes to
    fn events(&self) -> &EventBus;

    fn session(&self) -> &SessionInfo;

    fn emit_apply_buff(&self, participant_id: &str, buff_id: &str);

    fn emit_player_hp_change(&self, participant_id: &str, delta: i32);

    fn emit_exp_change(&self, delta: i32);

    fn emit_coin_change(&self, delta: i32);

    fn emit_input(&self, input: InputEvent);

    fn emit_create_player(&self, participant_id: &str, character_id: &str);

    fn emit_game_start(&self);

    fn emit_game_end(&self);

    /// Records the outcome of a run; only logged for now
    fn save_game_record(&self, record: &GameRecord) {
        info!(
            room_id = ?self.session().room_id(),
            level = record.level,
            personal_coin = record.personal_coin,
            "Game record saved"
        );
    }
}

/// Collaborators a session is built with
#[derive(Clone)]
pub struct SessionServices {
    pub roster: Arc<dyn Roster>,
    pub connector: Option<Arc<dyn ChannelConnector>>,
}

impl SessionServices {
    pub fn new(roster: Arc<dyn Roster>) -> Self {
        Self {
            roster,
            connector: None,
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn ChannelConnector>) -> Self {
        self.connector = Some(connector);
        self
    }
}

/// Builds the game system variant the configuration asks for
///
/// Offline sessions get a [`LocalGameSystem`]. Online sessions join their
/// room channel first, so a join failure surfaces here and no facade is
/// returned.
pub async fn create_game_system(
    config: &SessionConfig,
    services: SessionServices,
) -> Result<Arc<dyn GameSystem>, GameSystemError> {
    let session = SessionInfo::try_from(config)?;

    match session.kind() {
        SessionKind::Offline => {
            info!(
                participants = session.local_participants().len(),
                "Creating local game system"
            );
            Ok(Arc::new(LocalGameSystem::new(session, services.roster)))
        }
        SessionKind::Online => {
            let connector = services.connector.ok_or_else(|| {
                GameSystemError::configuration("Online sessions need a channel connector")
            })?;
            info!(
                room_id = ?session.room_id(),
                start_mode = %session.start_mode(),
                "Creating networked game system"
            );
            let system = RemoteGameSystem::connect(session, connector.as_ref()).await?;
            Ok(Arc::new(system))
        }
    }
}
