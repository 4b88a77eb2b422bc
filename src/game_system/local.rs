use std::sync::Arc;

use super::buff::{BuffAggregator, Roster};
use super::GameSystem;
use crate::config::SessionInfo;
use crate::event::{EventBus, GameEvent, InputEvent};

/// Game system for sessions where every participant shares this process
///
/// Each operation is a direct emit on the bus, except buff applications,
/// which go through the barrier.
pub struct LocalGameSystem {
    session: SessionInfo,
    bus: EventBus,
    buffs: BuffAggregator,
}

impl LocalGameSystem {
    pub fn new(session: SessionInfo, roster: Arc<dyn Roster>) -> Self {
        let bus = EventBus::new();
        let buffs = BuffAggregator::new(bus.clone(), roster);
        Self {
            session,
            bus,
            buffs,
        }
    }

    /// Buff entries waiting for the barrier
    pub fn pending_buffs(&self) -> usize {
        self.buffs.pending()
    }
}

impl GameSystem for LocalGameSystem {
    fn events(&self) -> &EventBus {
        &self.bus
    }

    fn session(&self) -> &SessionInfo {
        &self.session
    }

    fn emit_apply_buff(&self, participant_id: &str, buff_id: &str) {
        self.buffs.submit(participant_id, buff_id);
    }

    fn emit_player_hp_change(&self, participant_id: &str, delta: i32) {
        self.bus
            .emit(&GameEvent::player_hp_change(participant_id, delta));
    }

    fn emit_exp_change(&self, delta: i32) {
        self.bus.emit(&GameEvent::exp_change(delta));
    }

    fn emit_coin_change(&self, delta: i32) {
        self.bus.emit(&GameEvent::coin_change(delta));
    }

    fn emit_input(&self, input: InputEvent) {
        self.bus.emit(&GameEvent::Input(input));
    }

    fn emit_create_player(&self, participant_id: &str, character_id: &str) {
        self.bus
            .emit(&GameEvent::create_player(participant_id, character_id, true));
    }

    fn emit_game_start(&self) {
        self.bus.emit(&GameEvent::GameStart);
    }

    fn emit_game_end(&self) {
        self.bus.emit(&GameEvent::GameEnd);
    }
}
