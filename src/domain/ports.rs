//! Domain Ports (Port/Adapter Pattern)
//!
//! Abstractions over platform capabilities that sources call into without
//! reimplementing them. Adapters in [`crate::adapters`] implement these
//! traits.
//!
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │  sources::from_event         │───────▶│  EventTarget (port)          │
//! └──────────────────────────────┘        └──────────────┬───────────────┘
//!                                                        │
//!                                                        ▼
//!                                         ┌──────────────────────────────┐
//!                                         │  EventBus (adapter)          │
//!                                         └──────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

/// Callback registered for one event name.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle identifying a registered listener (value object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Something that dispatches named events of type `E` to listeners.
///
/// Implementations must tolerate listeners being added or removed from
/// inside a listener callback.
pub trait EventTarget<E>: Send + Sync {
    /// Register `listener` for `event` and return its handle.
    fn add_listener(&self, event: &str, listener: Listener<E>) -> ListenerId;

    /// Remove a listener. Returns false if it was not registered.
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_id_display() {
        let id = ListenerId::new(7);
        assert_eq!(id.as_u64(), 7);
        assert_eq!(id.to_string(), "listener-7");
    }
}
