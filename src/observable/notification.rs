//! Notifications and the recording observer
//!
//! [`Recorder`] captures every notification an observable delivers, in
//! arrival order. Tests use it to assert on exact `next`/`error`/`complete`
//! sequences and the demo binary uses it to print scenario summaries.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use super::Observer;
use crate::error::Error;

/// One call made on an observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notification<T> {
    /// `next(value)`
    Next(T),
    /// `error(err)`
    Error(Error),
    /// `complete()`
    Complete,
}

impl<T> Notification<T> {
    /// True for `Error` and `Complete`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }
}

/// Thread-safe observer sink recording notifications in arrival order.
pub struct Recorder<T> {
    notifications: Arc<Mutex<Vec<Notification<T>>>>,
    changed: Arc<Notify>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            notifications: Arc::clone(&self.notifications),
            changed: Arc::clone(&self.changed),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            changed: Arc::new(Notify::new()),
        }
    }
}

impl<T> std::fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("recorded", &self.notifications.lock().len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer writing into this recorder.
    pub fn observer(&self) -> Observer<T> {
        let on_next = self.clone();
        let on_error = self.clone();
        let on_complete = self.clone();
        Observer::new(
            move |value| on_next.record(Notification::Next(value)),
            move |err| on_error.record(Notification::Error(err)),
            move || on_complete.record(Notification::Complete),
        )
    }

    fn record(&self, notification: Notification<T>) {
        self.notifications.lock().push(notification);
        self.changed.notify_waiters();
    }

    /// Snapshot of everything recorded so far.
    pub fn notifications(&self) -> Vec<Notification<T>> {
        self.notifications.lock().clone()
    }

    /// Values passed to `next`, in order.
    pub fn values(&self) -> Vec<T> {
        self.notifications
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Errors passed to `error`, in order.
    pub fn errors(&self) -> Vec<Error> {
        self.notifications
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `complete` calls.
    pub fn completions(&self) -> usize {
        self.notifications
            .lock()
            .iter()
            .filter(|n| matches!(n, Notification::Complete))
            .count()
    }

    /// True once `complete` has been called at least once.
    pub fn is_complete(&self) -> bool {
        self.completions() > 0
    }

    /// Number of recorded notifications.
    pub fn len(&self) -> usize {
        self.notifications.lock().len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.notifications.lock().is_empty()
    }

    /// Wait until `predicate` holds over the recorded notifications.
    pub async fn wait_for<P>(&self, predicate: P)
    where
        P: Fn(&[Notification<T>]) -> bool,
    {
        loop {
            // Register before checking so a notification between the check
            // and the await is not lost.
            let changed = self.changed.notified();
            let satisfied = predicate(&self.notifications.lock());
            if satisfied {
                return;
            }
            changed.await;
        }
    }

    /// Wait for the first `complete`.
    pub async fn wait_for_complete(&self) {
        self.wait_for(|ns| ns.iter().any(|n| matches!(n, Notification::Complete)))
            .await
    }

    /// Wait for the first `error` or `complete`.
    pub async fn wait_for_terminal(&self) {
        self.wait_for(|ns| ns.iter().any(Notification::is_terminal))
            .await
    }

    /// Wait until at least `count` values have been emitted.
    pub async fn wait_for_values(&self, count: usize) {
        self.wait_for(|ns| {
            ns.iter()
                .filter(|n| matches!(n, Notification::Next(_)))
                .count()
                >= count
        })
        .await
    }
}
