//! In-memory sequence sources

use tracing::trace;

use crate::observable::{Observable, Subscription};

impl<T: Send + 'static> Observable<T> {
    /// Emit every element of `items` in order, then complete.
    ///
    /// Everything is delivered synchronously before `subscribe` returns.
    /// Each subscription walks its own clone of the sequence.
    pub fn from_vec(items: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_iterable(items)
    }

    /// Emit every element of a re-iterable collection in order, then
    /// complete.
    pub fn from_iterable<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Observable::new(move |observer| {
            let mut emitted = 0usize;
            for value in items.clone() {
                observer.next(value);
                emitted += 1;
            }
            trace!(emitted, "sequence drained");
            observer.complete();
            Subscription::empty()
        })
    }
}

impl<T> FromIterator<T> for Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Observable::from_vec(iter.into_iter().collect())
    }
}
