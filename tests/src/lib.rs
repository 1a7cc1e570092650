//! Integration tests for the Clotho callback library.

mod property_tests;

/// Integration tests for the complete Clotho system.
#[cfg(test)]
mod integration_tests {
    use clotho::{make_counter, Clotho, TaskError};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc, Barrier,
    };
    use std::thread;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_counter_scenario() {
        let mut c = make_counter();
        assert_eq!(c.call("a"), 1);
        assert_eq!(c.call("b"), 2);

        let mut d = make_counter();
        assert_eq!(d.call("x"), 1);
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn test_counters_on_separate_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    let mut counter = make_counter();
                    (0..1000).map(|i| counter.call(&i.to_string())).last()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(1000));
        }
    }

    #[test]
    fn test_run_forty_two() {
        let runtime = Clotho::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        let seen = calls.clone();
        runtime.run(
            || 42,
            move |result| {
                seen.fetch_add(1, Ordering::SeqCst);
                tx.send(result).unwrap();
            },
        );

        assert_eq!(rx.recv_timeout(WAIT).unwrap(), Ok(42));
        runtime.shutdown();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_does_not_block_caller() {
        let runtime = Clotho::builder().worker_threads(1).build().unwrap();
        let gate = Arc::new(Barrier::new(2));
        let (tx, rx) = mpsc::channel();

        let worker_gate = gate.clone();
        runtime.run(
            move || {
                worker_gate.wait();
                "late"
            },
            move |result| tx.send(result).unwrap(),
        );

        // Still pending until the caller releases the work.
        assert!(rx.try_recv().is_err());
        gate.wait();
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), Ok("late"));
    }

    #[test]
    fn test_concurrent_submitters_each_complete_once() {
        let runtime = Clotho::builder()
            .worker_threads(4)
            .queue_capacity(4096)
            .build()
            .unwrap();
        let completions = Arc::new(AtomicUsize::new(0));
        let total = Arc::new(AtomicUsize::new(0));

        let submitters: Vec<_> = (0..4)
            .map(|t| {
                let runtime = runtime.clone();
                let completions = completions.clone();
                let total = total.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        let completions = completions.clone();
                        let total = total.clone();
                        runtime.run(
                            move || t * 1000 + i,
                            move |result| {
                                total.fetch_add(result.unwrap(), Ordering::SeqCst);
                                completions.fetch_add(1, Ordering::SeqCst);
                            },
                        );
                    }
                })
            })
            .collect();

        for submitter in submitters {
            submitter.join().unwrap();
        }
        runtime.shutdown();

        let expected: usize = (0..4)
            .flat_map(|t| (0..250).map(move |i| t * 1000 + i))
            .sum();
        assert_eq!(completions.load(Ordering::SeqCst), 1000);
        assert_eq!(total.load(Ordering::SeqCst), expected);
        assert_eq!(runtime.stats().completed, 1000);
    }

    #[test]
    fn test_saturation_delivers_every_callback() {
        let runtime = Clotho::builder()
            .worker_threads(1)
            .queue_capacity(2)
            .build()
            .unwrap();
        let ok = Arc::new(AtomicUsize::new(0));
        let exhausted = Arc::new(AtomicUsize::new(0));

        for _ in 0..200 {
            let ok = ok.clone();
            let exhausted = exhausted.clone();
            runtime.run(
                || thread::sleep(Duration::from_micros(200)),
                move |result| match result {
                    Ok(()) => {
                        ok.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(TaskError::ResourceExhausted) => {
                        exhausted.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                },
            );
        }
        runtime.shutdown();

        let ok = ok.load(Ordering::SeqCst);
        let exhausted = exhausted.load(Ordering::SeqCst);
        assert_eq!(ok + exhausted, 200);
        assert!(exhausted > 0);

        let stats = runtime.stats();
        assert_eq!(stats.rejected as usize, exhausted);
        assert_eq!(stats.completed as usize, ok);
    }

    #[test]
    fn test_handles_after_shutdown() {
        let runtime = Clotho::builder().worker_threads(2).build().unwrap();
        let before = runtime.submit(|| 1);
        runtime.shutdown();
        let after = runtime.submit(|| 2);

        assert_eq!(before.join(), Ok(1));
        assert_eq!(after.join(), Err(TaskError::SpawnFailed));
    }

    #[test]
    fn test_dropping_last_clone_drains() {
        let done = Arc::new(AtomicUsize::new(0));
        {
            let runtime = Clotho::builder().worker_threads(1).build().unwrap();
            for _ in 0..10 {
                let done = done.clone();
                runtime.run(
                    || thread::sleep(Duration::from_millis(1)),
                    move |_| {
                        done.fetch_add(1, Ordering::SeqCst);
                    },
                );
            }
        }
        assert_eq!(done.load(Ordering::SeqCst), 10);
    }
}
