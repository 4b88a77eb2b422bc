use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use super::events::{EventName, GameEvent};
use super::handler::{EventHandler, FnHandler};

/// Opaque handle identifying one registration on an [`EventBus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

#[derive(Clone)]
struct Subscription {
    id: u64,
    name: EventName,
    handler: Arc<dyn EventHandler>,
    // Cleared on removal so an in-flight emit skips the entry
    active: Arc<AtomicBool>,
}

struct BusInner {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

/// Synchronous publish/subscribe core for one session
///
/// Handlers run on the caller's thread, in registration order, before
/// [`EventBus::emit`] returns. Cloning the bus shares the same subscriber list.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscriptions: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    fn subscriptions(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a handler for one event name
    ///
    /// Registering the same handler twice yields two independent
    /// registrations, each of which fires.
    pub fn subscribe(
        &self,
        name: EventName,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(event = %name, handler = handler.name(), id, "Subscribing handler");

        self.subscriptions().push(Subscription {
            id,
            name,
            handler,
            active: Arc::new(AtomicBool::new(true)),
        });

        SubscriptionHandle(id)
    }

    /// Registers a closure for one event name
    pub fn subscribe_fn<F>(&self, name: EventName, f: F) -> SubscriptionHandle
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.subscribe(name, Arc::new(FnHandler::new("closure", f)))
    }

    /// Removes the registration behind `handle`. Unknown handles are ignored.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut subscriptions = self.subscriptions();
        if let Some(pos) = subscriptions.iter().position(|s| s.id == handle.0) {
            let removed = subscriptions.remove(pos);
            removed.active.store(false, Ordering::Release);
            debug!(event = %removed.name, id = removed.id, "Unsubscribed handler");
        }
    }

    /// Removes the first registration of `handler` for `name`
    ///
    /// Identity is the `Arc` allocation, not structural equality.
    pub fn unsubscribe_handler(&self, name: EventName, handler: &Arc<dyn EventHandler>) {
        let mut subscriptions = self.subscriptions();
        if let Some(pos) = subscriptions
            .iter()
            .position(|s| s.name == name && Arc::ptr_eq(&s.handler, handler))
        {
            let removed = subscriptions.remove(pos);
            removed.active.store(false, Ordering::Release);
            debug!(event = %name, id = removed.id, "Unsubscribed handler");
        }
    }

    /// Dispatches `event` to every handler registered for its name
    ///
    /// The subscriber list is snapshotted before the first handler runs and
    /// the lock is released, so handlers may subscribe or unsubscribe freely.
    /// Registrations added during the emit fire from the next emit on;
    /// registrations removed during the emit are not called again.
    pub fn emit(&self, event: &GameEvent) {
        let name = event.name();
        let snapshot: Vec<Subscription> = self
            .subscriptions()
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect();

        debug!(event = %name, handlers = snapshot.len(), "Emitting event");

        for subscription in snapshot {
            if !subscription.active.load(Ordering::Acquire) {
                continue;
            }

            if let Err(e) = subscription.handler.handle(event) {
                warn!(
                    event = %name,
                    handler = subscription.handler.name(),
                    error = %e,
                    "Event handler failed"
                );
            }
        }
    }

    /// Number of live registrations for `name`
    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.subscriptions().iter().filter(|s| s.name == name).count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions().len())
            .finish()
    }
}
