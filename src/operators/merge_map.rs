//! merge_map / merge_map_unchecked
//!
//! Both variants subscribe to every inner observable as soon as its outer
//! value arrives, with no concurrency cap, and forward inner values in the
//! order they happen to occur.
//!
//! They differ only in how termination is handled:
//!
//! | Variant | `complete` downstream | `error` downstream |
//! |---|---|---|
//! | `merge_map` | once, after the outer and every inner completed | first error, then silence |
//! | `merge_map_unchecked` | whenever the outer or any inner completes | every error, as it arrives |

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Error;
use crate::observable::{Observable, Observer};

/// Shared bookkeeping for one `merge_map` subscription.
struct MergeState<U> {
    downstream: Observer<U>,
    /// Inner subscriptions that have not terminated yet
    active: AtomicUsize,
    outer_done: AtomicBool,
    /// Set once a terminal notification went downstream
    stopped: AtomicBool,
}

impl<U> MergeState<U> {
    fn new(downstream: Observer<U>) -> Self {
        Self {
            downstream,
            active: AtomicUsize::new(0),
            outer_done: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn emit(&self, value: U) {
        if !self.is_stopped() {
            self.downstream.next(value);
        }
    }

    fn fail(&self, err: Error) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            debug!(error = %err, "merged stream failed");
            self.downstream.error(err);
        }
    }

    fn inner_started(&self) -> usize {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn inner_completed(&self) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(remaining, "inner observable completed");
        if remaining == 0 && self.outer_done.load(Ordering::SeqCst) {
            self.finish();
        }
    }

    fn outer_completed(&self) {
        self.outer_done.store(true, Ordering::SeqCst);
        let active = self.active.load(Ordering::SeqCst);
        trace!(active, "outer observable completed");
        if active == 0 {
            self.finish();
        }
    }

    fn finish(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            debug!("merged stream completed");
            self.downstream.complete();
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Map every value to an inner observable and merge all of them.
    ///
    /// The merged stream completes once the source has completed and every
    /// inner observable has completed. The first error from the source or
    /// any inner observable terminates it; later notifications are
    /// dropped. A panic in `project` is delivered as
    /// `error(Error::Projection)`.
    ///
    /// The returned subscription tears down the source only.
    pub fn merge_map<U, F>(&self, project: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let project = Arc::new(project);

        Observable::new(move |downstream: Observer<U>| {
            let state = Arc::new(MergeState::new(downstream));
            let project = Arc::clone(&project);

            let on_next = Arc::clone(&state);
            let on_error = Arc::clone(&state);
            let on_complete = state;

            source.subscribe(Observer::new(
                move |value| {
                    if on_next.is_stopped() {
                        return;
                    }
                    let inner = match catch_unwind(AssertUnwindSafe(|| project(value))) {
                        Ok(inner) => inner,
                        Err(payload) => {
                            on_next.fail(Error::projection_panic(payload));
                            return;
                        }
                    };

                    let active = on_next.inner_started();
                    trace!(active, "subscribing inner observable");

                    // Sources that call complete after error must only be
                    // counted out once.
                    let inner_done = Arc::new(AtomicBool::new(false));
                    let error_done = Arc::clone(&inner_done);
                    let inner_next = Arc::clone(&on_next);
                    let inner_error = Arc::clone(&on_next);
                    let inner_complete = Arc::clone(&on_next);

                    inner.subscribe(Observer::new(
                        move |v| inner_next.emit(v),
                        move |err| {
                            if !error_done.swap(true, Ordering::SeqCst) {
                                inner_error.fail(err);
                            }
                        },
                        move || {
                            if !inner_done.swap(true, Ordering::SeqCst) {
                                inner_complete.inner_completed();
                            }
                        },
                    ));
                },
                move |err| on_error.fail(err),
                move || on_complete.outer_completed(),
            ))
        })
    }

    /// Map every value to an inner observable and merge them, forwarding
    /// every `error` and `complete` straight through.
    ///
    /// The first inner observable to complete therefore completes the
    /// downstream while other inner observables may still be emitting. Use
    /// [`Observable::merge_map`] unless this early termination is wanted.
    pub fn merge_map_unchecked<U, F>(&self, project: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let project = Arc::new(project);

        Observable::new(move |downstream: Observer<U>| {
            let project = Arc::clone(&project);
            let on_next = downstream.clone();
            let on_error = downstream.clone();
            let on_complete = downstream;

            source.subscribe(Observer::new(
                move |value| match catch_unwind(AssertUnwindSafe(|| project(value))) {
                    Ok(inner) => {
                        let forward = on_next.clone();
                        let (fail, finish) = (on_next.clone(), on_next.clone());
                        inner.subscribe(Observer::new(
                            move |v| forward.next(v),
                            move |err| fail.error(err),
                            move || finish.complete(),
                        ));
                    }
                    Err(payload) => on_next.error(Error::projection_panic(payload)),
                },
                move |err| on_error.error(err),
                move || on_complete.complete(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::{Notification, Recorder, Subscription};
    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    /// Observable whose observer is parked for the test to drive by hand.
    fn manual<T: Send + 'static>() -> (Observable<T>, Arc<Mutex<Vec<Observer<T>>>>) {
        let observers = Arc::new(Mutex::new(Vec::new()));
        let parked = Arc::clone(&observers);
        let observable = Observable::new(move |observer| {
            parked.lock().push(observer);
            Subscription::empty()
        });
        (observable, observers)
    }

    #[test]
    fn test_merge_map_flattens_sync_inners() {
        let recorder = Recorder::new();
        Observable::from_vec(vec![1, 2, 3])
            .merge_map(|v| Observable::from_vec(vec![v * 10, v * 10 + 1]))
            .subscribe(recorder.observer());

        assert_eq!(recorder.values(), vec![10, 11, 20, 21, 30, 31]);
        assert_eq!(recorder.completions(), 1);
        assert!(recorder.errors().is_empty());
    }

    #[test]
    fn test_merge_map_waits_for_all_inners() {
        let (outer, outer_observers) = manual::<usize>();
        let (inner, inner_observers) = manual::<&'static str>();

        let recorder = Recorder::new();
        outer
            .merge_map(move |_| inner.clone())
            .subscribe(recorder.observer());

        let outer_obs = outer_observers.lock()[0].clone();
        outer_obs.next(0);
        outer_obs.next(1);
        outer_obs.complete();

        let inners: Vec<_> = inner_observers.lock().clone();
        assert_eq!(inners.len(), 2);

        inners[1].next("b");
        inners[0].next("a");
        inners[0].complete();
        assert!(!recorder.is_complete());

        inners[1].next("b2");
        inners[1].complete();

        assert_eq!(recorder.values(), vec!["b", "a", "b2"]);
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn test_merge_map_waits_for_outer() {
        let (outer, outer_observers) = manual::<u8>();

        let recorder = Recorder::new();
        outer
            .merge_map(|v| Observable::from_vec(vec![v]))
            .subscribe(recorder.observer());

        let outer_obs = outer_observers.lock()[0].clone();
        outer_obs.next(5);
        assert!(!recorder.is_complete());

        outer_obs.complete();
        assert_eq!(
            recorder.notifications(),
            vec![Notification::Next(5), Notification::Complete]
        );
    }

    #[test]
    fn test_merge_map_first_error_is_terminal() {
        let (outer, outer_observers) = manual::<u8>();
        let (inner, inner_observers) = manual::<u8>();

        let recorder = Recorder::new();
        outer
            .merge_map(move |_| inner.clone())
            .subscribe(recorder.observer());

        let outer_obs = outer_observers.lock()[0].clone();
        outer_obs.next(0);
        outer_obs.next(1);

        let inners: Vec<_> = inner_observers.lock().clone();
        inners[0].error(Error::Generator("first".into()));
        inners[0].complete();
        inners[1].next(42);
        inners[1].error(Error::Generator("second".into()));
        outer_obs.complete();

        assert_eq!(
            recorder.notifications(),
            vec![Notification::Error(Error::Generator("first".into()))]
        );
    }

    #[test]
    fn test_merge_map_project_panic() {
        let recorder = Recorder::<i32>::new();
        Observable::from_vec(vec![1, 2])
            .merge_map(|v: i32| -> Observable<i32> {
                if v == 2 {
                    panic!("no inner for 2");
                }
                Observable::from_vec(vec![v])
            })
            .subscribe(recorder.observer());

        assert_eq!(recorder.values(), vec![1]);
        assert_matches!(recorder.errors().as_slice(), [Error::Projection(_)]);
        assert_eq!(recorder.completions(), 0);
    }

    #[test]
    fn test_merge_map_empty_outer_completes() {
        let recorder = Recorder::<i32>::new();
        Observable::from_vec(Vec::<i32>::new())
            .merge_map(|v| Observable::from_vec(vec![v]))
            .subscribe(recorder.observer());

        assert_eq!(recorder.notifications(), vec![Notification::Complete]);
    }

    #[test]
    fn test_unchecked_completes_on_first_inner() {
        let (outer, outer_observers) = manual::<u8>();
        let (inner, inner_observers) = manual::<u8>();

        let recorder = Recorder::new();
        outer
            .merge_map_unchecked(move |_| inner.clone())
            .subscribe(recorder.observer());

        let outer_obs = outer_observers.lock()[0].clone();
        outer_obs.next(0);
        outer_obs.next(1);

        let inners: Vec<_> = inner_observers.lock().clone();
        inners[0].complete();
        // Downstream already saw complete, yet the second inner keeps
        // pushing straight through.
        inners[1].next(7);

        assert_eq!(
            recorder.notifications(),
            vec![Notification::Complete, Notification::Next(7)]
        );
    }

    #[test]
    fn test_unchecked_forwards_every_terminal() {
        let recorder = Recorder::new();
        Observable::from_vec(vec![1, 2])
            .merge_map_unchecked(|v| Observable::from_vec(vec![v]))
            .subscribe(recorder.observer());

        assert_eq!(
            recorder.notifications(),
            vec![
                Notification::Next(1),
                Notification::Complete,
                Notification::Next(2),
                Notification::Complete,
                Notification::Complete,
            ]
        );
    }
}
