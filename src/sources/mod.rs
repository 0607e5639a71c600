//! Source Factories
//!
//! Constructors that turn common value sources into observables:
//!
//! | Factory | Source | Emission |
//! |---|---|---|
//! | [`from_vec`](crate::Observable::from_vec), [`from_iterable`](crate::Observable::from_iterable) | in-memory sequence | synchronous, inside `subscribe` |
//! | [`from_future`](crate::Observable::from_future), [`from_future_fn`](crate::Observable::from_future_fn) | single deferred value | spawned task |
//! | [`from_stream`](crate::Observable::from_stream), [`from_iter_fallible`](crate::Observable::from_iter_fallible) | lazy (possibly infinite) generator | spawned task, one element at a time |
//! | [`from_event`](crate::Observable::from_event) | [`EventTarget`](crate::domain::EventTarget) | listener callback |
//!
//! # Termination
//!
//! The future and generator sources call `complete` after every run, even
//! one that ended with `error`. A panic inside the future or generator is
//! reported the same way: `error(Error::Producer)` and then `complete`. Consumers that treat `error` as terminal can
//! ignore the trailing `complete`; [`Observable::merge_map`](crate::Observable::merge_map)
//! already does.
//!
//! # Cancellation
//!
//! Spawned sources return a subscription holding a
//! [`CancellationToken`]. Unsubscribing stops the task at its next
//! suspension point or before the next element; nothing further is
//! delivered, including `complete`.

mod array;
mod event;
mod future;
mod generator;

use std::future::Future;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, warn, Instrument};
use uuid::Uuid;

use crate::error::Error;
use crate::observable::{Observer, PanicBoundary, Subscription};

/// Spawn `drive` on the current tokio runtime for one subscription.
///
/// Without a runtime the observer gets `error(Error::NoRuntime)` followed by
/// `complete`, matching how the async sources report any other failure.
/// A panic raised by one of the observer's callbacks is not converted; it
/// unwinds the task.
pub(crate) fn spawn_source<T, D, Fut>(
    source: &'static str,
    observer: Observer<T>,
    drive: D,
) -> Subscription
where
    T: Send + 'static,
    D: FnOnce(Observer<T>, CancellationToken) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!(source, "subscribed outside of a tokio runtime");
            observer.error(Error::NoRuntime);
            observer.complete();
            return Subscription::empty();
        }
    };

    let token = CancellationToken::new();
    let subscription_id = Uuid::new_v4();
    let span = debug_span!("source", source, subscription_id = %subscription_id);

    let boundary = PanicBoundary::new();
    let guarded = observer.guarded(&boundary);
    let cancelled = token.clone();
    let task = std::panic::AssertUnwindSafe(drive(guarded, token.clone())).catch_unwind();

    handle.spawn(
        async move {
            debug!("source task started");
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    debug!("source task cancelled");
                }
                outcome = task => match outcome {
                    Ok(()) => debug!("source task finished"),
                    Err(payload) if boundary.consumer_panicked() => {
                        warn!("observer callback panicked inside source task");
                        std::panic::resume_unwind(payload)
                    }
                    Err(payload) => {
                        let err = Error::producer_panic(payload);
                        warn!(error = %err, "source task panicked");
                        if !boundary.terminated() {
                            observer.error(err);
                            observer.complete();
                        }
                    }
                },
            }
        }
        .instrument(span),
    );

    Subscription::from_token(token)
}
