//! Lazy sequence (generator) sources
//!
//! A generator is drained on its own task, one element at a time. The
//! driving task suspends between elements; the runtime keeps running other
//! work, so an infinite generator is fine as long as someone eventually
//! unsubscribes.

use futures::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::spawn_source;
use crate::error::Result;
use crate::observable::{Observable, Observer};

/// Drain `stream` into `observer`.
///
/// Stops at the first `Err`. `complete` is always called at the end unless
/// the token was cancelled first.
async fn drain<T, S>(observer: Observer<T>, token: CancellationToken, stream: S)
where
    S: Stream<Item = Result<T>>,
{
    futures::pin_mut!(stream);
    let mut emitted = 0u64;

    while let Some(item) = stream.next().await {
        if token.is_cancelled() {
            debug!(emitted, "generator cancelled");
            return;
        }
        match item {
            Ok(value) => {
                observer.next(value);
                emitted += 1;
            }
            Err(err) => {
                debug!(emitted, error = %err, "generator failed");
                observer.error(err);
                break;
            }
        }
    }

    debug!(emitted, "generator finished");
    observer.complete();
}

impl<T: Send + 'static> Observable<T> {
    /// Emit every item produced by an async generator.
    ///
    /// `factory` is called once per subscription, so every subscriber gets
    /// a fresh sequence. `Ok` items become `next`; the first `Err` becomes
    /// `error` and ends the sequence. `complete` is called afterwards in
    /// both cases. Requires a tokio runtime at subscribe time.
    pub fn from_stream<F, S>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Observable::new(move |observer| {
            let stream = factory();
            spawn_source("stream", observer, move |observer, token| {
                drain(observer, token, stream)
            })
        })
    }

    /// Emit every item produced by a synchronous generator.
    ///
    /// Same contract as [`Observable::from_stream`]. The driving task yields
    /// back to the runtime after every item so that an endless iterator
    /// cannot starve other tasks.
    pub fn from_iter_fallible<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Result<T>>,
        I::IntoIter: Send + 'static,
    {
        Observable::new(move |observer| {
            let items = stream::iter(factory()).then(|item| async move {
                tokio::task::yield_now().await;
                item
            });
            spawn_source("iter", observer, move |observer, token| {
                drain(observer, token, items)
            })
        })
    }
}
