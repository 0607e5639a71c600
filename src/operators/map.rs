//! map / try_map

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::observable::{Observable, Observer};

impl<T: Send + 'static> Observable<T> {
    /// Transform every value with `projection`.
    ///
    /// One downstream emission per upstream emission, same order.
    /// `error` and `complete` pass through unchanged. If `projection` panics
    /// the downstream receives `error(Error::Projection)` and nothing
    /// further from this subscription.
    pub fn map<U, F>(&self, projection: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.try_map(move |value| Ok(projection(value)))
    }

    /// Transform every value with a fallible `projection`.
    ///
    /// An `Err` is forwarded as `error`, after which the subscription stops
    /// forwarding.
    pub fn try_map<U, F>(&self, projection: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let projection = Arc::new(projection);

        Observable::new(move |downstream: Observer<U>| {
            let projection = Arc::clone(&projection);
            let stopped = Arc::new(AtomicBool::new(false));

            let on_next = downstream.clone();
            let next_stopped = Arc::clone(&stopped);
            let on_error = downstream.clone();
            let error_stopped = Arc::clone(&stopped);
            let on_complete = downstream;

            source.subscribe(Observer::new(
                move |value| {
                    if next_stopped.load(Ordering::Acquire) {
                        return;
                    }
                    let outcome = catch_unwind(AssertUnwindSafe(|| projection(value)))
                        .unwrap_or_else(|payload| Err(Error::projection_panic(payload)));
                    match outcome {
                        Ok(mapped) => on_next.next(mapped),
                        Err(err) => {
                            if !next_stopped.swap(true, Ordering::AcqRel) {
                                debug!(error = %err, "projection failed");
                                on_next.error(err);
                            }
                        }
                    }
                },
                move |err| {
                    if !error_stopped.load(Ordering::Acquire) {
                        on_error.error(err);
                    }
                },
                move || {
                    if !stopped.load(Ordering::Acquire) {
                        on_complete.complete();
                    }
                },
            ))
        })
    }
}
