use std::sync::{Arc, Mutex};
use std::time::Duration;
use strum::IntoEnumIterator;

use wizard_sync::{EventBus, EventName, GameEvent};

// ============================================================================
// Event Log
// ============================================================================

/// Records every event delivered on a bus, in delivery order
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

#[allow(dead_code)]
impl EventLog {
    /// Subscribes to every event name on `bus`
    pub fn attach(bus: &EventBus) -> Self {
        let log = Self::default();
        for name in EventName::iter() {
            let events = log.events.clone();
            bus.subscribe_fn(name, move |event| events.lock().unwrap().push(event.clone()));
        }
        log
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<EventName> {
        self.events().iter().map(GameEvent::name).collect()
    }

    pub fn count(&self, name: EventName) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Waits until at least `count` events were delivered
    ///
    /// Inbound messages are delivered by a spawned task, so networked tests
    /// poll here instead of asserting right after the emit.
    pub async fn wait_for(&self, count: usize) -> Vec<GameEvent> {
        for _ in 0..100 {
            if self.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}
