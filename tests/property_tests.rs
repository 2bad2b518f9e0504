//! Property-based tests using proptest.
//!
//! Verifies outcome helper laws, the zip policy, single delivery per start,
//! FIFO execution for arbitrary backlogs and lossless legacy round-trips.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use proptest::prelude::*;

use coldtask::legacy::AnyOutcome;
use coldtask::outcome::zip;
use coldtask::{batch, Outcome, SerialQueue, Task, TaskError};

// ─── Arbitrary Strategies ───────────────────────────────────────────────────

fn arb_outcome() -> impl Strategy<Value = Outcome<i64>> {
    prop_oneof![
        any::<i64>().prop_map(Outcome::success),
        "[a-z ]{1,24}".prop_map(|msg| Outcome::failure(TaskError::msg(msg))),
    ]
}

// ─── Outcome Laws ───────────────────────────────────────────────────────────

proptest! {
    /// Mapping the identity function changes nothing.
    #[test]
    fn map_identity(outcome in arb_outcome()) {
        prop_assert_eq!(outcome.clone().map(|v| v), outcome);
    }

    /// `and_then` with a success constructor is `map`.
    #[test]
    fn and_then_success_is_map(outcome in arb_outcome()) {
        let via_and_then = outcome.clone().and_then(|v| Outcome::success(v.wrapping_mul(3)));
        let via_map = outcome.map(|v| v.wrapping_mul(3));
        prop_assert_eq!(via_and_then, via_map);
    }

    /// Exactly one variant is ever populated.
    #[test]
    fn exactly_one_side(outcome in arb_outcome()) {
        prop_assert_ne!(outcome.value().is_some(), outcome.error().is_some());
        prop_assert_ne!(outcome.is_success(), outcome.is_failure());
    }

    /// Zip succeeds iff every input succeeds, and otherwise reports the first
    /// failure by position.
    #[test]
    fn zip_policy(outcomes in prop::collection::vec(arb_outcome(), 0..16)) {
        let first_failure = outcomes.iter().find_map(|o| o.error().cloned());
        let values: Vec<i64> = outcomes.iter().filter_map(|o| o.value().copied()).collect();

        match (zip(outcomes), first_failure) {
            (Outcome::Success(zipped), None) => prop_assert_eq!(zipped, values),
            (Outcome::Failure(err), Some(expected)) => prop_assert_eq!(err, expected),
            (zipped, expected) => prop_assert!(false, "zip gave {:?}, expected failure {:?}", zipped, expected),
        }
    }
}

// ─── Task Delivery ──────────────────────────────────────────────────────────

proptest! {
    /// Starting a task delivers exactly one outcome, equal to what the work reported.
    #[test]
    fn start_delivers_exactly_once(outcome in arb_outcome()) {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&deliveries);
        let (tx, rx) = mpsc::channel();

        Task::resolved(outcome.clone()).start(move |delivered| {
            counter.fetch_add(1, Ordering::SeqCst);
            tx.send(delivered).unwrap();
        });

        prop_assert_eq!(deliveries.load(Ordering::SeqCst), 1);
        prop_assert_eq!(rx.recv().unwrap(), outcome);
    }

    /// Batch aggregation agrees with zip over the children's outcomes.
    #[test]
    fn batch_matches_zip(outcomes in prop::collection::vec(arb_outcome(), 0..12)) {
        let expected = zip(outcomes.clone());
        let (tx, rx) = mpsc::channel();
        batch(outcomes.into_iter().map(Task::resolved).collect())
            .start(move |outcome| tx.send(outcome).unwrap());
        prop_assert_eq!(rx.recv().unwrap(), expected);
    }
}

// ─── Queue Ordering ─────────────────────────────────────────────────────────

proptest! {
    /// Any backlog of parked and immediate tasks runs in append order.
    #[test]
    fn queue_runs_in_append_order(parked in prop::collection::vec(any::<bool>(), 1..40)) {
        let queue = SerialQueue::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let held = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for (id, park) in parked.iter().copied().enumerate() {
            let order = Arc::clone(&order);
            let held = Arc::clone(&held);
            queue.append(Task::new(move |resolver| {
                order.lock().push(id);
                if park {
                    held.lock().push(resolver);
                } else {
                    resolver.succeed(());
                }
            }));
        }

        // Release parked tasks one at a time; each release lets the queue advance.
        loop {
            let next = held.lock().pop();
            match next {
                Some(resolver) => resolver.succeed(()),
                None => break,
            }
        }

        prop_assert!(queue.is_idle());
        prop_assert_eq!(order.lock().clone(), (0..parked.len()).collect::<Vec<_>>());
    }
}

// ─── Legacy Round-trip ──────────────────────────────────────────────────────

proptest! {
    /// Typed -> dynamic -> typed yields the original outcome.
    #[test]
    fn legacy_round_trip(outcome in arb_outcome()) {
        let back = AnyOutcome::from(outcome.clone()).into_outcome::<i64>().unwrap();
        prop_assert_eq!(back, outcome);
    }

    /// Round-tripping through raw parts preserves the outcome too.
    #[test]
    fn legacy_parts_round_trip(outcome in arb_outcome()) {
        let (value, error) = AnyOutcome::from(outcome.clone()).into_parts();
        prop_assert!(value.is_some() != error.is_some());
        let back = AnyOutcome::from_parts(value, error).unwrap().into_outcome::<i64>().unwrap();
        prop_assert_eq!(back, outcome);
    }
}
