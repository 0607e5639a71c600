//! Subscription - teardown handle returned by `subscribe`

use std::fmt;

use tokio_util::sync::CancellationToken;

/// Teardown handle for one subscription.
///
/// Either empty (the producer had nothing to release) or holding a one-shot
/// teardown action. Dropping a subscription does not tear it down; call
/// [`Subscription::unsubscribe`].
#[derive(Default)]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// A subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A subscription running `teardown` on unsubscribe.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription that cancels `token` on unsubscribe.
    pub fn from_token(token: CancellationToken) -> Self {
        Self::new(move || token.cancel())
    }

    /// True if unsubscribing would do nothing.
    pub fn is_empty(&self) -> bool {
        self.teardown.is_none()
    }

    /// Run the teardown action, if any.
    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("has_teardown", &self.teardown.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_empty_subscription() {
        let sub = Subscription::empty();
        assert!(sub.is_empty());
        sub.unsubscribe();
    }

    #[test]
    fn test_teardown_runs_once_on_unsubscribe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!sub.is_empty());
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_does_not_tear_down() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        drop(Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_token_subscription_cancels() {
        let token = CancellationToken::new();
        let sub = Subscription::from_token(token.clone());
        assert!(!token.is_cancelled());
        sub.unsubscribe();
        assert!(token.is_cancelled());
    }
}
