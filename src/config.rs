use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use tracing::debug;

use crate::game_system::GameSystemError;

/// Most players that can share one device in an offline session
pub const MAX_LOCAL_PLAYERS: usize = 3;

const ROOM_CODE_LENGTH: usize = 6;

/// Whether the session is played on one device or across processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SessionKind {
    Offline,
    Online,
}

/// How this process entered the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    /// This process created the room and owns replay at game start
    NewRoom,
    JoinRoom,
    /// A fixed number of players sharing the device
    Offline { players: usize },
}

impl FromStr for StartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new_room" => Ok(StartMode::NewRoom),
            "join_room" => Ok(StartMode::JoinRoom),
            other => other
                .strip_prefix("offline_")
                .and_then(|rest| rest.strip_suffix('p'))
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| (1..=MAX_LOCAL_PLAYERS).contains(n))
                .map(|players| StartMode::Offline { players })
                .ok_or_else(|| format!("Unsupported start mode: {}", s)),
        }
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartMode::NewRoom => write!(f, "new_room"),
            StartMode::JoinRoom => write!(f, "join_room"),
            StartMode::Offline { players } => write!(f, "offline_{}p", players),
        }
    }
}

/// Raw session setup as handed over by the menu layer or the environment
///
/// Nothing here is trusted; [`SessionInfo::try_from`] does the validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub kind: String,
    pub start_mode: String,
    pub room_id: Option<String>,
    pub local_participants: Vec<String>,
}

impl SessionConfig {
    /// Reads the session setup from `GAME_*` environment variables
    pub fn from_env() -> Self {
        let kind = std::env::var("GAME_SESSION_KIND").unwrap_or_else(|_| "offline".to_string());
        let start_mode =
            std::env::var("GAME_START_MODE").unwrap_or_else(|_| "offline_1p".to_string());
        let room_id = std::env::var("GAME_ROOM_ID").ok().filter(|s| !s.is_empty());
        let local_participants = std::env::var("GAME_LOCAL_PLAYERS")
            .unwrap_or_else(|_| "p1".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            kind,
            start_mode,
            room_id,
            local_participants,
        }
    }

    pub fn offline(participants: &[&str]) -> Self {
        Self {
            kind: SessionKind::Offline.to_string(),
            start_mode: StartMode::Offline {
                players: participants.len(),
            }
            .to_string(),
            room_id: None,
            local_participants: participants.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn online_new_room(participant: &str, room_id: Option<&str>) -> Self {
        Self {
            kind: SessionKind::Online.to_string(),
            start_mode: StartMode::NewRoom.to_string(),
            room_id: room_id.map(str::to_string),
            local_participants: vec![participant.to_string()],
        }
    }

    pub fn online_join_room(participant: &str, room_id: &str) -> Self {
        Self {
            kind: SessionKind::Online.to_string(),
            start_mode: StartMode::JoinRoom.to_string(),
            room_id: Some(room_id.to_string()),
            local_participants: vec![participant.to_string()],
        }
    }
}

/// Validated, immutable description of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    room_id: Option<String>,
    local_participants: Vec<String>,
    start_mode: StartMode,
    kind: SessionKind,
}

impl SessionInfo {
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn local_participants(&self) -> &[String] {
        &self.local_participants
    }

    pub fn start_mode(&self) -> StartMode {
        self.start_mode
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// The room-creating role drains the replay buffer at game start
    pub fn is_room_creator(&self) -> bool {
        self.start_mode == StartMode::NewRoom
    }
}

impl TryFrom<&SessionConfig> for SessionInfo {
    type Error = GameSystemError;

    fn try_from(config: &SessionConfig) -> Result<Self, Self::Error> {
        let kind = SessionKind::from_str(config.kind.trim()).map_err(|_| {
            GameSystemError::configuration(format!("Unsupported session kind: {}", config.kind))
        })?;
        let start_mode =
            StartMode::from_str(&config.start_mode).map_err(GameSystemError::configuration)?;

        if config.local_participants.is_empty() {
            return Err(GameSystemError::configuration(
                "At least one local participant is required",
            ));
        }

        let room_id = match (kind, start_mode) {
            (SessionKind::Offline, StartMode::Offline { players }) => {
                if players != config.local_participants.len() {
                    return Err(GameSystemError::configuration(format!(
                        "Start mode {} expects {} local participants, got {}",
                        start_mode,
                        players,
                        config.local_participants.len()
                    )));
                }
                None
            }
            (SessionKind::Online, StartMode::NewRoom) => Some(
                config
                    .room_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(generate_room_code),
            ),
            (SessionKind::Online, StartMode::JoinRoom) => Some(
                config
                    .room_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        GameSystemError::configuration("Joining a room requires a room id")
                    })?,
            ),
            (kind, start_mode) => {
                return Err(GameSystemError::configuration(format!(
                    "Start mode {} is not valid for a {} session",
                    start_mode, kind
                )));
            }
        };

        if let Some(id) = &room_id {
            validate_room_id(id)?;
        }

        debug!(
            kind = %kind,
            start_mode = %start_mode,
            room_id = ?room_id,
            "Session configuration validated"
        );

        Ok(Self {
            room_id,
            local_participants: config.local_participants.clone(),
            start_mode,
            kind,
        })
    }
}

/// Room ids end up in channel names and relay urls
fn validate_room_id(room_id: &str) -> Result<(), GameSystemError> {
    let valid = room_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(GameSystemError::configuration(format!(
            "Room id {:?} may only contain letters, digits, '-' and '_'",
            room_id
        )))
    }
}

/// Short uppercase code players can read out to each other
pub fn generate_room_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// Settings for the relay binary
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("RELAY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}
