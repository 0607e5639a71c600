//! Observable Core
//!
//! A cold, push-based producer. An [`Observable`] wraps one subscribe
//! function; every call to [`Observable::subscribe`] runs that function
//! afresh with the caller's [`Observer`], so subscribers never share
//! producer state.
//!
//! # Protocol
//!
//! ```text
//! subscribe(observer)
//!     └─▶ subscribe_fn(observer) ─▶ next* (error | complete)? ─▶ Subscription
//! ```
//!
//! The core adds no scheduling. A producer may emit synchronously inside
//! `subscribe`, later from a spawned task, or never.
//!
//! # Example
//!
//! ```
//! use pushstream::{Observable, Subscription};
//!
//! let numbers = Observable::new(|observer| {
//!     observer.next(1);
//!     observer.next(2);
//!     observer.complete();
//!     Subscription::empty()
//! });
//!
//! numbers.map(|n| n * 10).subscribe_next(|n| println!("{n}"));
//! ```

mod notification;
mod observer;
mod proptest;
mod subscription;

use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{trace, warn};

use crate::error::Error;

pub use notification::{Notification, Recorder};
pub use observer::{CompleteFn, ErrorFn, NextFn, Observer};
pub(crate) use observer::PanicBoundary;
pub use subscription::Subscription;

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync;

/// Lazy push-based producer of `T` values.
///
/// Cloning shares the subscribe function, never per-subscription state.
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("item", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> Observable<T> {
    /// Wrap a subscribe function.
    ///
    /// The function is not called here. It runs once per `subscribe` call
    /// and returns the teardown for that subscription.
    pub fn new<F>(subscribe_fn: F) -> Self
    where
        F: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            subscribe_fn: Arc::new(subscribe_fn),
        }
    }

    /// Subscribe with a full observer.
    ///
    /// Runs the subscribe function exactly once, synchronously, and returns
    /// its subscription. A panic raised by the producer itself is reported
    /// as `error(Error::Producer)` and an empty subscription is returned,
    /// unless the observer has already seen `error` or `complete`. A panic
    /// raised by one of the observer's own callbacks is not caught.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        trace!(item = std::any::type_name::<T>(), "subscribing");
        let boundary = PanicBoundary::new();
        let guarded = observer.guarded(&boundary);
        match catch_unwind(AssertUnwindSafe(|| (self.subscribe_fn)(guarded))) {
            Ok(subscription) => subscription,
            Err(payload) if boundary.consumer_panicked() => resume_unwind(payload),
            Err(payload) => {
                let err = Error::producer_panic(payload);
                if boundary.terminated() {
                    warn!(error = %err, "producer panicked after terminating");
                } else {
                    warn!(error = %err, "producer panicked during subscribe");
                    observer.error(err);
                }
                Subscription::empty()
            }
        }
    }

    /// Subscribe with only a `next` callback.
    ///
    /// Errors and completion are discarded.
    pub fn subscribe_next<N>(&self, next: N) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(Observer::from_next(next))
    }

    /// Subscribe with separate `next`, `error` and `complete` callbacks.
    pub fn subscribe_with<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
        E: Fn(Error) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.subscribe(Observer::new(next, error, complete))
    }
}
