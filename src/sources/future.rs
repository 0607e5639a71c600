//! Single deferred value sources

use std::future::Future;

use futures::FutureExt;
use tracing::debug;

use super::spawn_source;
use crate::error::Result;
use crate::observable::{Observable, Observer};

/// Deliver a resolved outcome.
///
/// `complete` follows unconditionally, including after `error`.
fn deliver<T>(observer: &Observer<T>, outcome: Result<T>) {
    match outcome {
        Ok(value) => observer.next(value),
        Err(err) => {
            debug!(error = %err, "future rejected");
            observer.error(err);
        }
    }
    observer.complete();
}

impl<T: Send + 'static> Observable<T> {
    /// Emit the outcome of `future`.
    ///
    /// The future is driven at most once no matter how many subscribers
    /// there are; every subscription receives a clone of the same outcome.
    /// `Ok(v)` becomes `next(v)`, `Err(e)` becomes `error(e)`, and
    /// `complete` follows in both cases. Requires a tokio runtime at
    /// subscribe time.
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        T: Clone + Sync,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = future.boxed().shared();
        Observable::new(move |observer| {
            let shared = shared.clone();
            spawn_source("future", observer, move |observer, _| async move {
                deliver(&observer, shared.await);
            })
        })
    }

    /// Emit the outcome of a future created per subscription.
    ///
    /// Unlike [`Observable::from_future`] nothing is shared: each
    /// subscription calls `factory` and drives its own future.
    pub fn from_future_fn<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Observable::new(move |observer| {
            let future = factory();
            spawn_source("future_fn", observer, move |observer, _| async move {
                deliver(&observer, future.await);
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::observable::{Notification, Recorder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolved_future_emits_then_completes() {
        let recorder = Recorder::new();
        Observable::from_future(async { Ok(22) }).subscribe(recorder.observer());

        recorder.wait_for_complete().await;
        assert_eq!(
            recorder.notifications(),
            vec![Notification::Next(22), Notification::Complete]
        );
    }

    #[tokio::test]
    async fn test_rejected_future_errors_then_completes() {
        let recorder = Recorder::<i32>::new();
        Observable::from_future(async { Err(Error::Rejected("nope".into())) })
            .subscribe(recorder.observer());

        recorder.wait_for_complete().await;
        assert_eq!(
            recorder.notifications(),
            vec![
                Notification::Error(Error::Rejected("nope".into())),
                Notification::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn test_nothing_emitted_synchronously() {
        let recorder = Recorder::new();
        Observable::from_future(async { Ok(1) }).subscribe(recorder.observer());
        assert!(recorder.is_empty());
        recorder.wait_for_complete().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_future() {
        let recorder = Recorder::new();
        Observable::from_future(async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok("late")
        })
        .subscribe(recorder.observer());

        recorder.wait_for_complete().await;
        assert_eq!(recorder.values(), vec!["late"]);
    }

    #[tokio::test]
    async fn test_shared_future_runs_once() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polls);
        let observable = Observable::from_future(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(5u8)
        });

        let first = Recorder::new();
        let second = Recorder::new();
        observable.subscribe(first.observer());
        observable.subscribe(second.observer());

        first.wait_for_complete().await;
        second.wait_for_complete().await;

        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert_eq!(first.values(), vec![5]);
        assert_eq!(second.values(), vec![5]);
    }

    #[tokio::test]
    async fn test_future_fn_runs_per_subscription() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let observable = Observable::from_future_fn(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n) }
        });

        let first = Recorder::new();
        let second = Recorder::new();
        observable.subscribe(first.observer());
        observable.subscribe(second.observer());
        first.wait_for_complete().await;
        second.wait_for_complete().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let mut all = first.values();
        all.extend(second.values());
        all.sort_unstable();
        assert_eq!(all, vec![0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_before_resolution() {
        let recorder = Recorder::new();
        let sub = Observable::from_future(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(1)
        })
        .subscribe(recorder.observer());

        tokio::time::sleep(Duration::from_secs(1)).await;
        sub.unsubscribe();
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert!(recorder.is_empty());
    }

    #[test]
    fn test_without_runtime_reports_error() {
        let recorder = Recorder::<i32>::new();
        let sub = Observable::from_future(async { Ok(1) }).subscribe(recorder.observer());

        assert!(sub.is_empty());
        assert_eq!(
            recorder.notifications(),
            vec![Notification::Error(Error::NoRuntime), Notification::Complete]
        );
    }
}
