use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::GameSystemError;
use super::replay::{ReplayBuffer, ReplayEntry};
use super::GameSystem;
use crate::channel::{ChannelConnector, ChannelHandle, ChannelMessage, JoinedChannel};
use crate::config::SessionInfo;
use crate::event::{EventBus, GameEvent, InputEvent, PlayerCreated};

#[derive(Default)]
struct LobbyState {
    started: bool,
    replay: ReplayBuffer,
    // Participants already created on the local bus before the start
    created: HashSet<String>,
}

/// What the start transition hands back to the caller
struct StartBatch {
    replayed: Vec<ReplayEntry>,
    to_create: Vec<ReplayEntry>,
}

struct RemoteCore {
    session: SessionInfo,
    bus: EventBus,
    channel: Arc<dyn ChannelHandle>,
    lobby: Mutex<LobbyState>,
}

impl RemoteCore {
    fn lobby(&self) -> MutexGuard<'_, LobbyState> {
        self.lobby.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sender_id(&self) -> Option<&str> {
        self.session.local_participants().first().map(String::as_str)
    }

    fn broadcast(&self, event: &GameEvent) {
        match ChannelMessage::from_event(event) {
            Ok(message) => {
                let message = match self.sender_id() {
                    Some(sender) => message.with_sender(sender),
                    None => message,
                };
                self.channel.broadcast(&message);
            }
            Err(e) => {
                warn!(event = %event.name(), error = %e, "Failed to encode event for broadcast");
            }
        }
    }

    /// Local delivery first, then the broadcast
    fn dispatch(&self, event: GameEvent) {
        self.bus.emit(&event);
        self.broadcast(&event);
    }

    /// Moves the lobby into the started state, exactly once
    ///
    /// Returns `None` when the session had already started.
    fn begin(&self) -> Option<StartBatch> {
        let mut lobby = self.lobby();
        if lobby.started {
            return None;
        }
        lobby.started = true;

        let replayed = lobby.replay.drain();
        let mut to_create = Vec::new();
        for entry in &replayed {
            if lobby.created.insert(entry.participant_id.clone()) {
                to_create.push(entry.clone());
            }
        }

        Some(StartBatch {
            replayed,
            to_create,
        })
    }

    fn create_remote(&self, entry: ReplayEntry) {
        self.bus.emit(&GameEvent::CreatePlayer(PlayerCreated {
            participant_id: entry.participant_id,
            character_id: entry.character_id,
            is_local: false,
        }));
    }

    fn start_game(&self) {
        if let Some(batch) = self.begin() {
            info!(
                room_id = ?self.session.room_id(),
                replayed = batch.replayed.len(),
                "Game started"
            );
            for entry in batch.to_create {
                self.create_remote(entry);
            }
            // Late joiners learn the lobby from the creator's re-broadcast
            if self.session.is_room_creator() {
                for entry in batch.replayed {
                    self.broadcast(&GameEvent::create_player(
                        entry.participant_id,
                        entry.character_id,
                        false,
                    ));
                }
            }
        }

        self.dispatch(GameEvent::GameStart);
    }

    fn handle_inbound(&self, message: ChannelMessage) {
        let event = match message.to_event() {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    event = %message.event,
                    sender = ?message.sender(),
                    error = %e,
                    "Dropping undecodable channel message"
                );
                return;
            }
        };

        match event {
            GameEvent::CreatePlayer(created) => {
                {
                    let mut lobby = self.lobby();
                    if !lobby.started {
                        debug!(
                            participant_id = %created.participant_id,
                            character_id = %created.character_id,
                            "Remote player held until the game starts"
                        );
                        lobby.replay.record(ReplayEntry {
                            participant_id: created.participant_id,
                            character_id: created.character_id,
                        });
                        return;
                    }
                }
                self.bus.emit(&GameEvent::CreatePlayer(created));
            }
            GameEvent::GameStart => {
                if let Some(batch) = self.begin() {
                    info!(
                        room_id = ?self.session.room_id(),
                        sender = ?message.sender(),
                        "Game started by peer"
                    );
                    for entry in batch.to_create {
                        self.create_remote(entry);
                    }
                }
                self.bus.emit(&GameEvent::GameStart);
            }
            other => self.bus.emit(&other),
        }
    }
}

/// Game system for sessions whose participants sit in different processes
///
/// Every local emit is delivered to the local bus and then broadcast to the
/// room. Inbound messages are delivered to the local bus as they arrive,
/// except participant creations seen before the game starts: those are held
/// in a replay buffer and released at the start. The room creator holds back
/// the broadcast of its own lobby creations and sends the whole buffer, once,
/// ahead of the start message, so peers that joined late still create every
/// participant. Buff applications are not synchronized.
pub struct RemoteGameSystem {
    core: Arc<RemoteCore>,
    listener: JoinHandle<()>,
}

impl RemoteGameSystem {
    /// Joins the session's room and starts listening for inbound messages
    pub async fn connect(
        session: SessionInfo,
        connector: &dyn ChannelConnector,
    ) -> Result<Self, GameSystemError> {
        let room_id = session
            .room_id()
            .ok_or_else(|| GameSystemError::configuration("A networked session needs a room id"))?
            .to_string();

        let JoinedChannel {
            handle,
            mut inbound,
        } = connector.join(&room_id).await.map_err(|e| {
            warn!(room_id = %room_id, error = %e, "Failed to join room channel");
            e
        })?;

        info!(
            room_id = %room_id,
            creator = session.is_room_creator(),
            "Joined room channel"
        );

        let core = Arc::new(RemoteCore {
            session,
            bus: EventBus::new(),
            channel: handle,
            lobby: Mutex::new(LobbyState::default()),
        });

        let listener_core = core.clone();
        let listener = tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                listener_core.handle_inbound(message);
            }
            debug!(room_id = %room_id, "Room channel closed");
        });

        Ok(Self { core, listener })
    }

    /// Delivers one inbound channel message as if the transport had
    ///
    /// The listener task calls this for every message it receives.
    pub fn handle_inbound(&self, message: ChannelMessage) {
        self.core.handle_inbound(message);
    }

    pub fn has_started(&self) -> bool {
        self.core.lobby().started
    }

    /// Creations held until the game starts
    pub fn pending_creations(&self) -> usize {
        self.core.lobby().replay.len()
    }
}

impl Drop for RemoteGameSystem {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl GameSystem for RemoteGameSystem {
    fn events(&self) -> &EventBus {
        &self.core.bus
    }

    fn session(&self) -> &SessionInfo {
        &self.core.session
    }

    fn emit_apply_buff(&self, participant_id: &str, buff_id: &str) {
        warn!(
            participant_id = %participant_id,
            buff_id = %buff_id,
            "Buff application is not synchronized in networked sessions, ignoring"
        );
    }

    fn emit_player_hp_change(&self, participant_id: &str, delta: i32) {
        self.core
            .dispatch(GameEvent::player_hp_change(participant_id, delta));
    }

    fn emit_exp_change(&self, delta: i32) {
        self.core.dispatch(GameEvent::exp_change(delta));
    }

    fn emit_coin_change(&self, delta: i32) {
        self.core.dispatch(GameEvent::coin_change(delta));
    }

    fn emit_input(&self, input: InputEvent) {
        self.core.dispatch(GameEvent::Input(input));
    }

    fn emit_create_player(&self, participant_id: &str, character_id: &str) {
        // The creator announces its lobby players once, with the start
        let withheld = {
            let mut lobby = self.core.lobby();
            lobby.created.insert(participant_id.to_string());
            let withhold = !lobby.started && self.core.session.is_room_creator();
            if withhold {
                lobby.replay.record(ReplayEntry {
                    participant_id: participant_id.to_string(),
                    character_id: character_id.to_string(),
                });
            }
            withhold
        };

        let event = GameEvent::create_player(participant_id, character_id, true);
        if withheld {
            debug!(
                participant_id = %participant_id,
                "Local player announced to the room at game start"
            );
            self.core.bus.emit(&event);
        } else {
            self.core.dispatch(event);
        }
    }

    fn emit_game_start(&self) {
        self.core.start_game();
    }

    fn emit_game_end(&self) {
        self.core.dispatch(GameEvent::GameEnd);
    }
}
