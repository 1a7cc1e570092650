//! Walkthrough of stateful callbacks and deferred completion
//!
//! This example demonstrates:
//! - Counters that keep their own state between calls
//! - Escaping completions delivered from a worker thread
//! - The inline (non-escaping) variant
//! - Scheduling failures arriving through the same callback
//!
//! Run with `RUST_LOG=clotho=debug` to see the trace events.

use clotho::{init_logging, make_counter, Clotho, LogLevel};
use std::sync::mpsc;
use std::time::Duration;

fn main() {
    init_logging(LogLevel::Info);

    let runtime = Clotho::builder()
        .worker_threads(2)
        .queue_capacity(4)
        .build()
        .expect("Failed to create Clotho runtime");

    println!("Clotho Closure Walkthrough");
    println!("==========================");

    // Example 1: capturing values
    println!("\n1. Counters keep their own state:");

    let mut counter = make_counter();
    println!("  Andaman -> {}", counter.call("Andaman"));
    println!("  Nicobar -> {}", counter.call("Nicobar"));

    let mut other = make_counter();
    println!("  A fresh counter starts over: {}", other.call("Lakshadweep"));

    let mut as_closure = counter.into_fn();
    println!("  The first counter as a closure continues: {}", as_closure("Havelock"));

    // Example 2: escaping completion
    println!("\n2. Fetching data in the background:");

    let (tx, rx) = mpsc::channel();
    runtime.run(
        || {
            println!("  Fetching data...");
            std::thread::sleep(Duration::from_millis(200));
            "Data fetched from server"
        },
        move |result| {
            let _ = tx.send(result);
        },
    );
    println!("  run() returned before the work finished");

    match rx.recv() {
        Ok(Ok(value)) => println!("  received: {value}"),
        Ok(Err(err)) => println!("  failed: {err}"),
        Err(_) => println!("  completion channel closed"),
    }

    // Example 3: non-escaping completion
    println!("\n3. Processing data inline:");

    runtime.run_inline(
        || "swiftyx60".to_uppercase(),
        |result| match result {
            Ok(processed) => println!("  Result: {processed}"),
            Err(err) => println!("  failed: {err}"),
        },
    );

    // Example 4: handles instead of callbacks
    println!("\n4. Waiting on a handle:");

    let handle = runtime.submit(|| (1..=10u64).product::<u64>());
    println!("  10! = {:?}", handle.join());

    // Example 5: failures use the same channel
    println!("\n5. Submitting after shutdown:");

    runtime.shutdown();
    runtime.run(|| 42, |result| println!("  completion: {result:?}"));

    println!("\nStats: {:?}", runtime.stats());
}
