//! Observer - the callback triple a producer pushes into

use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Error;

/// Callback invoked for every emitted value.
pub type NextFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callback invoked when the producer fails.
pub type ErrorFn = Arc<dyn Fn(Error) + Send + Sync>;

/// Callback invoked when the producer finishes.
pub type CompleteFn = Arc<dyn Fn() + Send + Sync>;

/// The `next`/`error`/`complete` triple through which a producer reports to
/// a consumer.
///
/// Cloning an observer is cheap and the clones share the same callbacks, so
/// one downstream observer can be handed to any number of inner
/// subscriptions.
///
/// Nothing here stops a producer from calling `next` after `error` or
/// `complete`. Producers are expected to stop on their own.
pub struct Observer<T> {
    next: NextFn<T>,
    error: ErrorFn,
    complete: CompleteFn,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            next: Arc::clone(&self.next),
            error: Arc::clone(&self.error),
            complete: Arc::clone(&self.complete),
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}

impl<T: 'static> Observer<T> {
    /// Create an observer from all three callbacks.
    pub fn new<N, E, C>(next: N, error: E, complete: C) -> Self
    where
        N: Fn(T) + Send + Sync + 'static,
        E: Fn(Error) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        Self {
            next: Arc::new(next),
            error: Arc::new(error),
            complete: Arc::new(complete),
        }
    }

    /// Create an observer with only a `next` callback.
    ///
    /// `error` and `complete` default to no-ops, so failures reaching this
    /// observer are dropped.
    pub fn from_next<N>(next: N) -> Self
    where
        N: Fn(T) + Send + Sync + 'static,
    {
        Self::new(next, |_| {}, || {})
    }

    /// Replace the `error` callback.
    pub fn on_error<E>(mut self, error: E) -> Self
    where
        E: Fn(Error) + Send + Sync + 'static,
    {
        self.error = Arc::new(error);
        self
    }

    /// Replace the `complete` callback.
    pub fn on_complete<C>(mut self, complete: C) -> Self
    where
        C: Fn() + Send + Sync + 'static,
    {
        self.complete = Arc::new(complete);
        self
    }
}

/// What a producer's observer has seen, as recorded by [`Observer::guarded`].
///
/// A panic boundary consults this to tell a failing producer apart from a
/// consumer callback that panicked, and to avoid reporting a failure after
/// the observer has already terminated.
#[derive(Debug, Default)]
pub(crate) struct PanicBoundary {
    consumer_panicked: AtomicBool,
    terminated: AtomicBool,
}

impl PanicBoundary {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// True once a callback behind this boundary has panicked.
    pub(crate) fn consumer_panicked(&self) -> bool {
        self.consumer_panicked.load(Ordering::Acquire)
    }

    /// True once `error` or `complete` has been delivered.
    pub(crate) fn terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn shield<R>(&self, callback: impl FnOnce() -> R) -> R {
        match catch_unwind(AssertUnwindSafe(callback)) {
            Ok(result) => result,
            Err(payload) => {
                self.consumer_panicked.store(true, Ordering::Release);
                resume_unwind(payload)
            }
        }
    }
}

impl<T: 'static> Observer<T> {
    /// Wrap this observer so `boundary` records terminal notifications and
    /// panics raised by the callbacks. Panics still propagate to the caller.
    pub(crate) fn guarded(&self, boundary: &Arc<PanicBoundary>) -> Self {
        let (next, on_next) = (Arc::clone(&self.next), Arc::clone(boundary));
        let (error, on_error) = (Arc::clone(&self.error), Arc::clone(boundary));
        let (complete, on_complete) = (Arc::clone(&self.complete), Arc::clone(boundary));

        Self::new(
            move |value| on_next.shield(|| next(value)),
            move |err| {
                on_error.terminated.store(true, Ordering::Release);
                on_error.shield(|| error(err))
            },
            move || {
                on_complete.terminated.store(true, Ordering::Release);
                on_complete.shield(|| complete())
            },
        )
    }
}

impl<T> Observer<T> {
    /// Push a value.
    pub fn next(&self, value: T) {
        (self.next)(value)
    }

    /// Report a failure.
    pub fn error(&self, err: Error) {
        (self.error)(err)
    }

    /// Report completion.
    pub fn complete(&self) {
        (self.complete)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_from_next_defaults_are_noops() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = Observer::from_next(move |v: i32| sink.lock().push(v));

        observer.next(1);
        observer.error(Error::Producer("ignored".into()));
        observer.complete();
        observer.next(2);

        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_builder_callbacks() {
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let (a, b, c) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

        let observer = Observer::from_next(move |v: u8| a.lock().push(format!("next:{v}")))
            .on_error(move |e| b.lock().push(format!("error:{e}")))
            .on_complete(move || c.lock().push("complete".into()));

        observer.next(1);
        observer.error(Error::Generator("bad".into()));
        observer.complete();

        assert_eq!(
            *log.lock(),
            vec!["next:1", "error:Generator failed: bad", "complete"]
        );
    }

    #[test]
    fn test_clones_share_callbacks() {
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        let observer = Observer::from_next(move |_: ()| *sink.lock() += 1);
        let other = observer.clone();

        observer.next(());
        other.next(());

        assert_eq!(*seen.lock(), 2);
    }

    #[test]
    fn test_guarded_records_terminal() {
        let boundary = PanicBoundary::new();
        let observer = Observer::from_next(|_: u8| {}).guarded(&boundary);

        observer.next(1);
        assert!(!boundary.terminated());
        observer.complete();
        assert!(boundary.terminated());
        assert!(!boundary.consumer_panicked());
    }

    #[test]
    fn test_guarded_flags_and_rethrows_callback_panic() {
        let boundary = PanicBoundary::new();
        let observer = Observer::from_next(|v: u8| assert!(v < 2, "too big")).guarded(&boundary);

        observer.next(1);
        let outcome = catch_unwind(AssertUnwindSafe(|| observer.next(5)));

        assert!(outcome.is_err());
        assert!(boundary.consumer_panicked());
    }
}
