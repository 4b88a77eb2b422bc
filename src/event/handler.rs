use thiserror::Error;

use super::events::GameEvent;

/// Errors a handler can report back to the bus
///
/// The bus never propagates these to the emitter. They are logged and the
/// remaining handlers still run.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Handler failed: {0}")]
    Failed(String),
}

impl EventError {
    pub fn failed(msg: impl Into<String>) -> Self {
        EventError::Failed(msg.into())
    }
}

/// Trait for components that react to game events
///
/// A handler is called synchronously on the emitting thread. It receives the
/// event by reference and must not assume it is the only reader.
///
/// The handler object doubles as its own owning context: the bus identifies
/// a registration by the `Arc` it was given, so an owner that wants to
/// unsubscribe keeps that `Arc` (or the returned handle) around.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &GameEvent) -> Result<(), EventError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str {
        "anonymous"
    }
}

/// Adapts a closure into an [`EventHandler`]
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&GameEvent) + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&GameEvent) + Send + Sync,
{
    fn handle(&self, event: &GameEvent) -> Result<(), EventError> {
        (self.f)(event);
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A handler that does nothing, for tests that need a registration to exist
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn handle(&self, _event: &GameEvent) -> Result<(), EventError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NoOpEventHandler"
    }
}
