use std::mem;

/// A participant creation seen before the game started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayEntry {
    pub participant_id: String,
    pub character_id: String,
}

/// Append-only record of creations observed in the lobby
///
/// Drained exactly once, when the session starts. After that it stays empty
/// and refuses new entries.
#[derive(Debug, Default)]
pub struct ReplayBuffer {
    entries: Vec<ReplayEntry>,
    drained: bool,
}

impl ReplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry`; returns false once the buffer has been drained
    pub fn record(&mut self, entry: ReplayEntry) -> bool {
        if self.drained {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Takes every entry in arrival order; later calls return nothing
    pub fn drain(&mut self) -> Vec<ReplayEntry> {
        self.drained = true;
        mem::take(&mut self.entries)
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
