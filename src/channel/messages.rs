use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{
    BuffApplied, CoinChanged, EventName, ExpChanged, GameEvent, HpChanged, InputEvent,
    PlayerCreated,
};

/// Metadata for channel messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMeta {
    pub timestamp: DateTime<Utc>,
    pub sender: Option<String>,
}

/// Envelope exchanged between peers over a room channel
///
/// The event name travels next to an untyped payload so an inbound message
/// can be demultiplexed by name before its payload is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub event: EventName,
    pub payload: serde_json::Value,
    pub meta: Option<MessageMeta>,
}

/// Create-player payload as sent between peers
///
/// Locality is a property of the receiving process, so it is not sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerPayload {
    pub participant_id: String,
    pub character_id: String,
}

impl ChannelMessage {
    pub fn new(event: EventName, payload: serde_json::Value) -> Self {
        Self {
            event,
            payload,
            meta: Some(MessageMeta {
                timestamp: Utc::now(),
                sender: None,
            }),
        }
    }

    /// Attach the id of the sending participant
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        let meta = self.meta.get_or_insert_with(|| MessageMeta {
            timestamp: Utc::now(),
            sender: None,
        });
        meta.sender = Some(sender.into());
        self
    }

    /// Builds the outbound message for a locally emitted event
    pub fn from_event(event: &GameEvent) -> Result<Self, serde_json::Error> {
        let payload = match event {
            GameEvent::BuffApply(p) => serde_json::to_value(p)?,
            GameEvent::PlayerHpChange(p) => serde_json::to_value(p)?,
            GameEvent::ExpChange(p) => serde_json::to_value(p)?,
            GameEvent::CoinChange(p) => serde_json::to_value(p)?,
            GameEvent::Input(p) => serde_json::to_value(p)?,
            GameEvent::CreatePlayer(p) => serde_json::to_value(CreatePlayerPayload {
                participant_id: p.participant_id.clone(),
                character_id: p.character_id.clone(),
            })?,
            GameEvent::GameStart | GameEvent::GameEnd => serde_json::Value::Null,
        };

        Ok(Self::new(event.name(), payload))
    }

    /// Decodes the payload according to the event name
    ///
    /// Create-player events decode with `is_local = false`: anything that
    /// arrives over the channel belongs to another process.
    pub fn to_event(&self) -> Result<GameEvent, serde_json::Error> {
        let payload = self.payload.clone();
        let event = match self.event {
            EventName::BuffApply => {
                GameEvent::BuffApply(serde_json::from_value::<BuffApplied>(payload)?)
            }
            EventName::PlayerHpChange => {
                GameEvent::PlayerHpChange(serde_json::from_value::<HpChanged>(payload)?)
            }
            EventName::ExpChange => {
                GameEvent::ExpChange(serde_json::from_value::<ExpChanged>(payload)?)
            }
            EventName::CoinChange => {
                GameEvent::CoinChange(serde_json::from_value::<CoinChanged>(payload)?)
            }
            EventName::Input => GameEvent::Input(serde_json::from_value::<InputEvent>(payload)?),
            EventName::CreatePlayer => {
                let p = serde_json::from_value::<CreatePlayerPayload>(payload)?;
                GameEvent::CreatePlayer(PlayerCreated {
                    participant_id: p.participant_id,
                    character_id: p.character_id,
                    is_local: false,
                })
            }
            EventName::GameStart => GameEvent::GameStart,
            EventName::GameEnd => GameEvent::GameEnd,
        };

        Ok(event)
    }

    /// The sending participant, if the sender stamped one
    pub fn sender(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.sender.as_deref())
    }
}
