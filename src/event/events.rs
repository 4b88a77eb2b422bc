use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Names of the semantic events shared between gameplay code and peers
///
/// This is a closed set. The SCREAMING_SNAKE_CASE form is what travels on
/// the wire and what shows up in logs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventName {
    BuffApply,
    PlayerHpChange,
    ExpChange,
    CoinChange,
    Input,
    CreatePlayer,
    GameStart,
    GameEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffApplied {
    pub participant_id: String,
    pub buff_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpChanged {
    pub participant_id: String,
    pub delta: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpChanged {
    pub delta: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinChanged {
    pub delta: i32,
}

/// Abstract input actions, already translated from whatever device produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputAction {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    Skill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub participant_id: String,
    pub action: InputAction,
    pub state: InputState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCreated {
    pub participant_id: String,
    pub character_id: String,
    /// True only on the process that owns the participant
    pub is_local: bool,
}

/// Semantic game events
///
/// Events represent facts that already happened. Each variant carries the
/// payload for exactly one [`EventName`], so a handler that matches on the
/// variant never has to guess at the payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    BuffApply(BuffApplied),
    PlayerHpChange(HpChanged),
    ExpChange(ExpChanged),
    CoinChange(CoinChanged),
    Input(InputEvent),
    CreatePlayer(PlayerCreated),
    GameStart,
    GameEnd,
}

impl GameEvent {
    /// The name subscribers register against for this event
    pub fn name(&self) -> EventName {
        match self {
            GameEvent::BuffApply(_) => EventName::BuffApply,
            GameEvent::PlayerHpChange(_) => EventName::PlayerHpChange,
            GameEvent::ExpChange(_) => EventName::ExpChange,
            GameEvent::CoinChange(_) => EventName::CoinChange,
            GameEvent::Input(_) => EventName::Input,
            GameEvent::CreatePlayer(_) => EventName::CreatePlayer,
            GameEvent::GameStart => EventName::GameStart,
            GameEvent::GameEnd => EventName::GameEnd,
        }
    }

    pub fn buff_apply(participant_id: impl Into<String>, buff_id: impl Into<String>) -> Self {
        GameEvent::BuffApply(BuffApplied {
            participant_id: participant_id.into(),
            buff_id: buff_id.into(),
        })
    }

    pub fn player_hp_change(participant_id: impl Into<String>, delta: i32) -> Self {
        GameEvent::PlayerHpChange(HpChanged {
            participant_id: participant_id.into(),
            delta,
        })
    }

    pub fn exp_change(delta: i32) -> Self {
        GameEvent::ExpChange(ExpChanged { delta })
    }

    pub fn coin_change(delta: i32) -> Self {
        GameEvent::CoinChange(CoinChanged { delta })
    }

    pub fn create_player(
        participant_id: impl Into<String>,
        character_id: impl Into<String>,
        is_local: bool,
    ) -> Self {
        GameEvent::CreatePlayer(PlayerCreated {
            participant_id: participant_id.into(),
            character_id: character_id.into(),
            is_local,
        })
    }
}
