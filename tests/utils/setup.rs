use std::sync::Arc;
use std::time::Duration;

use wizard_sync::{
    channel::InMemoryChannelHub, create_game_system, GameSystem, PlayerRoster, SessionConfig,
    SessionServices,
};

use super::event_log::EventLog;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// One participant's process in a networked test room
pub struct Peer {
    pub participant_id: String,
    pub system: Arc<dyn GameSystem>,
    pub log: EventLog,
}

pub struct TestSetup {
    pub hub: InMemoryChannelHub,
    pub room_id: String,
    pub roster: PlayerRoster,
    pub peers: Vec<Peer>,
}

#[allow(dead_code)]
impl TestSetup {
    pub fn peer(&self, participant_id: &str) -> &Peer {
        self.peers
            .iter()
            .find(|p| p.participant_id == participant_id)
            .unwrap()
    }

    /// Joins one more participant after the room already exists
    pub async fn join_late(&mut self, participant_id: &str) -> &Peer {
        self.peers
            .push(join(&self.hub, &self.roster, &self.room_id, participant_id, false).await);
        self.peers.last().unwrap()
    }
}

pub struct TestSetupBuilder {
    room_id: String,
    players: Vec<String>,
}

async fn join(
    hub: &InMemoryChannelHub,
    roster: &PlayerRoster,
    room_id: &str,
    participant_id: &str,
    creator: bool,
) -> Peer {
    let config = if creator {
        SessionConfig::online_new_room(participant_id, Some(room_id))
    } else {
        SessionConfig::online_join_room(participant_id, room_id)
    };
    roster.add(participant_id);
    let services = SessionServices::new(Arc::new(roster.clone()))
        .with_connector(Arc::new(hub.connector(participant_id)));
    let system = create_game_system(&config, services).await.unwrap();
    let log = EventLog::attach(system.events());

    Peer {
        participant_id: participant_id.to_string(),
        system,
        log,
    }
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            room_id: "ROOM01".to_string(),
            players: vec![],
        }
    }

    pub fn with_room(mut self, room_id: &str) -> Self {
        self.room_id = room_id.to_string();
        self
    }

    /// The first player creates the room, the rest join it
    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol"])
    }

    pub async fn build(self) -> TestSetup {
        let hub = InMemoryChannelHub::new();
        let roster = PlayerRoster::new();
        let mut peers = Vec::new();

        for (i, player) in self.players.iter().enumerate() {
            peers.push(join(&hub, &roster, &self.room_id, player, i == 0).await);
        }

        TestSetup {
            hub,
            room_id: self.room_id,
            roster,
            peers,
        }
    }
}

/// Gives spawned listener tasks time to drain their inbound queues
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
