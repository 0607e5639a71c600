//! Event Bus Adapter
//!
//! In-process implementation of the `EventTarget` port.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::domain::ports::{EventTarget, Listener, ListenerId};

/// Named-event dispatcher keeping listeners in memory.
///
/// Listeners for an event run in registration order. The listener list is
/// snapshotted before dispatch, so a listener may add or remove listeners
/// (including itself) without deadlocking; such changes apply from the next
/// `emit`.
pub struct EventBus<E> {
    listeners: DashMap<String, Vec<(ListenerId, Listener<E>)>>,
    next_id: AtomicU64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_names", &self.listeners.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch `payload` to every listener of `event`.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &str, payload: E) -> usize {
        let snapshot: Vec<Listener<E>> = match self.listeners.get(event) {
            Some(entry) => entry.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => Vec::new(),
        };

        trace!(event, listeners = snapshot.len(), "emitting event");
        for listener in &snapshot {
            listener(&payload);
        }
        snapshot.len()
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|l| l.len()).unwrap_or(0)
    }

    /// True if no listener is registered for any event.
    pub fn is_empty(&self) -> bool {
        self.listeners.iter().all(|entry| entry.value().is_empty())
    }
}

impl<E> EventTarget<E> for EventBus<E>
where
    E: 'static,
{
    fn add_listener(&self, event: &str, listener: Listener<E>) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push((id, listener));
        debug!(event, listener = %id, "listener added");
        id
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let removed = match self.listeners.get_mut(event) {
            Some(mut entry) => {
                let before = entry.len();
                entry.retain(|(existing, _)| *existing != id);
                entry.len() != before
            }
            None => false,
        };
        self.listeners.remove_if(event, |_, l| l.is_empty());

        if removed {
            debug!(event, listener = %id, "listener removed");
        }
        removed
    }
}
