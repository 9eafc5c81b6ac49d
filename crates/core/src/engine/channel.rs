//! In-process lifecycle event channel.
//!
//! Listeners subscribe per event type and are invoked synchronously, once
//! each, by [`EventChannel::emit`]. Delivery works on a snapshot of the
//! listeners registered when the emission started, so listeners may
//! subscribe or unsubscribe from inside a callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use journalflow_shared::types::JournalEntryId;
use serde::Serialize;

use crate::ledger::JournalEntry;
use crate::lifecycle::EventType;

/// A lifecycle change published to listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleEvent {
    /// Kind of change.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The entry the change applies to.
    pub entry_id: JournalEntryId,
    /// The entry after the change, when there is one.
    pub entry: Option<JournalEntry>,
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        event_type: EventType,
        entry_id: JournalEntryId,
        entry: Option<JournalEntry>,
    ) -> Self {
        Self {
            event_type,
            entry_id,
            entry,
            timestamp: Utc::now(),
        }
    }
}

type Listener = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<EventType, Vec<(u64, Listener)>>,
}

/// Publish/subscribe channel for lifecycle events.
///
/// Cloning yields another handle to the same listener registry.
#[derive(Clone, Default)]
pub struct EventChannel {
    registry: Arc<Mutex<Registry>>,
}

impl EventChannel {
    /// Creates a channel with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one event type.
    ///
    /// The listener stays registered until the returned subscription is
    /// unsubscribed; dropping the handle does not unsubscribe.
    pub fn on<F>(&self, event_type: EventType, listener: F) -> Subscription
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .listeners
            .entry(event_type)
            .or_default()
            .push((id, listener));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event_type,
            id,
        }
    }

    /// Delivers an event to every listener registered for its type.
    ///
    /// Returns the number of listeners invoked. The registry lock is not
    /// held while listeners run.
    pub fn emit(&self, event: &LifecycleEvent) -> usize {
        let snapshot: Vec<Listener> = lock(&self.registry)
            .listeners
            .get(&event.event_type)
            .map(|listeners| listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    /// Number of listeners registered for an event type.
    #[must_use]
    pub fn listener_count(&self, event_type: EventType) -> usize {
        lock(&self.registry)
            .listeners
            .get(&event_type)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = lock(&self.registry);
        let counts: HashMap<EventType, usize> = registry
            .listeners
            .iter()
            .map(|(event_type, listeners)| (*event_type, listeners.len()))
            .collect();
        f.debug_struct("EventChannel")
            .field("listeners", &counts)
            .finish()
    }
}

/// Handle returned by [`EventChannel::on`].
#[derive(Debug, Clone)]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    event_type: EventType,
    id: u64,
}

impl Subscription {
    /// Removes the listener.
    ///
    /// Returns true if this call removed it; later calls are no-ops.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let Some(listeners) = registry.listeners.get_mut(&self.event_type) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        before != listeners.len()
    }

    /// The event type this subscription listens to.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
