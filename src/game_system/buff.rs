use std::mem;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

use crate::event::{BuffApplied, EventBus, GameEvent};

/// Source of the number of participants a buff round waits for
pub trait Roster: Send + Sync {
    fn participant_count(&self) -> usize;
}

/// Shared list of participant ids in the current session
///
/// Cloning shares the list. Whoever spawns and removes players keeps it up
/// to date; the buff barrier reads it on every submission.
#[derive(Debug, Clone, Default)]
pub struct PlayerRoster {
    ids: Arc<RwLock<Vec<String>>>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roster = Self::new();
        for id in ids {
            roster.add(id);
        }
        roster
    }

    /// Adds a participant; adding a known id again has no effect
    pub fn add(&self, id: impl Into<String>) {
        let id = id.into();
        let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn remove(&self, id: &str) {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|known| known != id);
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Roster for PlayerRoster {
    fn participant_count(&self) -> usize {
        self.len()
    }
}

/// Barrier that holds buff applications until every participant has one
///
/// Entries are released as one batch, in submission order, once the number
/// of buffered entries reaches the roster size. Submissions are not
/// deduplicated: two entries for the same participant count twice.
pub struct BuffAggregator {
    bus: EventBus,
    roster: Arc<dyn Roster>,
    pending: Mutex<Vec<BuffApplied>>,
}

impl BuffAggregator {
    pub fn new(bus: EventBus, roster: Arc<dyn Roster>) -> Self {
        Self {
            bus,
            roster,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn submit(&self, participant_id: &str, buff_id: &str) {
        let batch = {
            let mut pending = self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            pending.push(BuffApplied {
                participant_id: participant_id.to_string(),
                buff_id: buff_id.to_string(),
            });

            let expected = self.roster.participant_count();
            if pending.len() >= expected {
                mem::take(&mut *pending)
            } else {
                debug!(
                    participant_id = %participant_id,
                    buff_id = %buff_id,
                    pending = pending.len(),
                    expected,
                    "Buff held until every participant has chosen"
                );
                return;
            }
        };

        debug!(entries = batch.len(), "Releasing buff batch");
        // Emitted outside the lock so handlers may submit again
        for entry in batch {
            self.bus.emit(&GameEvent::BuffApply(entry));
        }
    }

    /// Entries waiting for the barrier
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
