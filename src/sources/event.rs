//! Event target source

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{EventTarget, Listener};
use crate::observable::{Observable, Subscription};

impl<T: Clone + Send + 'static> Observable<T> {
    /// Emit every occurrence of `event` dispatched by `target`.
    ///
    /// Subscribing registers one listener; unsubscribing removes it. The
    /// stream never completes or errors on its own.
    pub fn from_event<Tg>(target: Arc<Tg>, event: impl Into<String>) -> Self
    where
        Tg: EventTarget<T> + ?Sized + 'static,
    {
        let event = event.into();
        Observable::new(move |observer| {
            let listener: Listener<T> = Arc::new(move |payload: &T| observer.next(payload.clone()));
            let id = target.add_listener(&event, listener);

            let target = Arc::clone(&target);
            let event = event.clone();
            Subscription::new(move || {
                if target.remove_listener(&event, id) {
                    debug!(event = %event, listener = %id, "event subscription torn down");
                }
            })
        })
    }
}
