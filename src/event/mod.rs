// Event-driven core shared by both game system variants
//
// Gameplay code only ever talks to the bus and the typed events defined here;
// it never learns whether an event came from this process or from a peer.

// Public API - what other modules can use
pub use bus::{EventBus, SubscriptionHandle};
pub use events::{
    BuffApplied, CoinChanged, EventName, ExpChanged, GameEvent, HpChanged, InputAction,
    InputEvent, InputState, PlayerCreated,
};
pub use handler::{EventError, EventHandler, FnHandler, NoOpEventHandler};

// Internal modules
mod bus;
mod events;
mod handler;
