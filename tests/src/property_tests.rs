//! Property-based tests for counters and deferred completion.

#[cfg(test)]
mod proptest_tests {
    use clotho::{make_counter, Clotho};
    use proptest::prelude::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: the k-th call on one counter returns k
        #[test]
        fn prop_counter_kth_call(calls in 1usize..500) {
            let mut counter = make_counter();
            for k in 1..=calls {
                prop_assert_eq!(counter.call("step"), k as u64);
            }
        }

        /// Property: completion sees exactly the value work returns, once
        #[test]
        fn prop_run_delivers_work_value_once(
            values in prop::collection::vec(any::<i64>(), 1..32),
            workers in 1usize..4,
        ) {
            let runtime = Clotho::builder()
                .worker_threads(workers)
                .queue_capacity(64)
                .build()
                .unwrap();
            let calls = Arc::new(AtomicUsize::new(0));
            let seen = Arc::new(Mutex::new(Vec::new()));

            for &value in &values {
                let calls = calls.clone();
                let seen = seen.clone();
                runtime.run(move || value, move |result| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    seen.lock().unwrap().push(result.unwrap());
                });
            }
            runtime.shutdown();

            prop_assert_eq!(calls.load(Ordering::SeqCst), values.len());

            // Completions may arrive in any order.
            let mut seen = seen.lock().unwrap().clone();
            let mut expected = values.clone();
            seen.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(seen, expected);
        }
    }
}

#[cfg(test)]
mod quickcheck_tests {
    use clotho::make_counter;
    use quickcheck::quickcheck;

    quickcheck! {
        /// Interleaved calls on two counters never leak into each other.
        fn qc_interleaved_counters_isolated(pattern: Vec<bool>) -> bool {
            let mut left = make_counter();
            let mut right = make_counter();
            let (mut l, mut r) = (0u64, 0u64);

            pattern.into_iter().all(|pick_left| {
                if pick_left {
                    l += 1;
                    left.call("left") == l
                } else {
                    r += 1;
                    right.call("right") == r
                }
            })
        }
    }
}
