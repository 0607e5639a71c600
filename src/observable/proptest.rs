//! Property-Based Tests for the Observable protocol
//!
//! # Test Properties
//!
//! 1. **Sequence fidelity**: `from_vec(s)` emits `s` in order, then one `complete`
//! 2. **Map preservation**: `map(f)` emits `f(v)` for every `v`, same order
//! 3. **Merge coverage**: `merge_map(g)` emits the union of every inner sequence
//! 4. **Cold independence**: every subscription sees the full sequence

#![cfg(test)]

use proptest::prelude::*;

use super::{Notification, Observable, Recorder};

// =============================================================================
// Property Strategies
// =============================================================================

/// Strategy for small integer sequences, empty included.
fn sequence_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1_000i64..1_000, 0..64)
}

/// Strategy for outer sequences whose values fan out into inner sequences.
fn fan_out_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..8, 0..16)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: every element is emitted once, in order, followed by a single complete.
    #[test]
    fn prop_from_vec_emits_sequence(items in sequence_strategy()) {
        let recorder = Recorder::new();
        Observable::from_vec(items.clone()).subscribe(recorder.observer());

        let mut expected: Vec<Notification<i64>> =
            items.into_iter().map(Notification::Next).collect();
        expected.push(Notification::Complete);

        prop_assert_eq!(recorder.notifications(), expected);
    }

    /// Property: map applies the projection to every value and keeps order.
    #[test]
    fn prop_map_preserves_order(items in sequence_strategy(), offset in -50i64..50) {
        let recorder = Recorder::new();
        Observable::from_vec(items.clone())
            .map(move |v| v * 3 + offset)
            .subscribe(recorder.observer());

        let expected: Vec<i64> = items.iter().map(|v| v * 3 + offset).collect();
        prop_assert_eq!(recorder.values(), expected);
        prop_assert_eq!(recorder.completions(), 1);
    }

    /// Property: the merged stream carries every inner value and completes once.
    #[test]
    fn prop_merge_map_covers_all_inners(outer in fan_out_strategy()) {
        let recorder = Recorder::new();
        Observable::from_vec(outer.clone())
            .merge_map(|n| Observable::from_iterable(0..u32::from(n)))
            .subscribe(recorder.observer());

        let mut expected: Vec<u32> = outer.iter().flat_map(|&n| 0..u32::from(n)).collect();
        let mut actual = recorder.values();
        expected.sort_unstable();
        actual.sort_unstable();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(recorder.completions(), 1);
        prop_assert!(recorder.errors().is_empty());
    }

    /// Property: subscriptions share no cursor state.
    #[test]
    fn prop_subscriptions_are_independent(items in sequence_strategy(), subscribers in 1usize..5) {
        let observable = Observable::from_vec(items.clone());
        let recorders: Vec<Recorder<i64>> = (0..subscribers).map(|_| Recorder::new()).collect();

        for recorder in &recorders {
            observable.subscribe(recorder.observer());
        }

        for recorder in &recorders {
            prop_assert_eq!(recorder.values(), items.clone());
            prop_assert_eq!(recorder.completions(), 1);
        }
    }
}
