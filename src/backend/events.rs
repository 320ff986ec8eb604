//! Callback registry for backend event streams.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use tracing::trace;
use crate::core::{BackendEvent, EventTopic};

/// Callback invoked for every event on the subscribed topic.
pub type EventHandler = Arc<dyn Fn(&BackendEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<u64, (EventTopic, EventHandler)>,
}

/// Fan-out of backend events to topic subscribers.
///
/// Handlers run synchronously on the emitting thread, outside the registry lock,
/// so a handler may itself subscribe or unsubscribe.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: EventTopic, handler: EventHandler) -> Subscription {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.insert(id, (topic, handler));
        trace!("Subscribed #{} to {}", id, topic.as_str());

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to every handler of its topic. Returns how many ran.
    pub fn emit(&self, event: BackendEvent) -> usize {
        let topic = event.topic();
        let handlers: Vec<EventHandler> = self
            .registry
            .lock()
            .handlers
            .values()
            .filter(|(t, _)| *t == topic)
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, topic: EventTopic) -> usize {
        self.registry
            .lock()
            .handlers
            .values()
            .filter(|(t, _)| *t == topic)
            .count()
    }
}

/// Keeps a handler attached; dropping it (or calling [`unsubscribe`](Self::unsubscribe))
/// detaches the handler.
#[must_use = "dropping a Subscription detaches its handler immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.lock().handlers.remove(&self.id).is_some() {
                trace!("Unsubscribed #{}", self.id);
            }
        }
    }
}
