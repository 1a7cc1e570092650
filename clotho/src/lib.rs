//! # Clotho - Spinning Callbacks Back to Their Callers
//!
//! Clotho is a small concurrency library built around two patterns:
//!
//! - **Stateful callbacks**: [`make_counter`] hands out independent counters,
//!   each owning a private count
//! - **Deferred completion**: [`Clotho::run`] executes work on a background
//!   worker pool and invokes a completion callback exactly once with the
//!   outcome, including scheduling failures
//!
//! ## Example
//!
//! ```
//! use clotho::prelude::*;
//! use std::sync::mpsc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = Clotho::builder().worker_threads(2).build()?;
//!
//! let mut counter = make_counter();
//! assert_eq!(counter.call("Andaman"), 1);
//! assert_eq!(counter.call("Nicobar"), 2);
//!
//! let (tx, rx) = mpsc::channel();
//! runtime.run(|| "Data fetched from server", move |result| {
//!     tx.send(result).unwrap();
//! });
//! assert_eq!(rx.recv()?, Ok("Data fetched from server"));
//!
//! runtime.shutdown();
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

mod logging;

pub use clotho_core::{
    make_counter, CompletionRunner, CompletionToken, Counter, ExecutorConfig, ExecutorControl,
    ExecutorError, ExecutorResult, RunnerStats, TaskError, TaskHandle, TaskId, TaskResult,
};
pub use clotho_executor::PoolExecutor;
pub use logging::{init_logging, LogLevel};

use std::sync::{Arc, OnceLock};

/// The Clotho runtime: a cheaply cloneable handle to a shared worker pool.
///
/// The pool shuts down when the last clone is dropped, or earlier through
/// [`Clotho::shutdown`].
#[derive(Clone, Debug)]
pub struct Clotho {
    executor: Arc<PoolExecutor>,
}

impl Clotho {
    /// Create a new runtime with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot be started.
    pub fn new() -> ExecutorResult<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the runtime.
    #[must_use]
    pub fn builder() -> ClothoBuilder {
        ClothoBuilder::new()
    }

    /// Run `work` on a worker and pass its outcome to `on_complete`.
    ///
    /// Returns immediately. `on_complete` is called exactly once: on a worker
    /// thread after `work` finishes, or on this thread with an error if the
    /// work could not be queued.
    pub fn run<T, W, C>(&self, work: W, on_complete: C)
    where
        W: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
        C: FnOnce(TaskResult<T>) + Send + 'static,
    {
        self.executor.run(work, on_complete);
    }

    /// Run `work` on a worker and return a handle to its result.
    pub fn submit<T, W>(&self, work: W) -> TaskHandle<T>
    where
        W: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.executor.submit(work)
    }

    /// Run `work` and then `on_complete` on this thread before returning.
    pub fn run_inline<T, W, C>(&self, work: W, on_complete: C)
    where
        W: FnOnce() -> T,
        C: FnOnce(TaskResult<T>),
    {
        self.executor.run_inline(work, on_complete);
    }

    /// Stop accepting work and wait for queued work to finish.
    pub fn shutdown(&self) {
        self.executor.shutdown();
    }

    /// Check if the runtime is shutting down.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.executor.is_shutting_down()
    }

    /// Get the number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.executor.worker_count()
    }

    /// Get the number of queued jobs not yet picked up.
    #[must_use]
    pub fn load(&self) -> usize {
        self.executor.load()
    }

    /// Get runtime statistics.
    #[must_use]
    pub fn stats(&self) -> RunnerStats {
        self.executor.stats()
    }
}

/// Builder for configuring the Clotho runtime.
#[derive(Debug, Clone, Default)]
pub struct ClothoBuilder {
    config: ExecutorConfig,
}

impl ClothoBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set how many jobs may wait in the queue before submissions fail.
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the thread name prefix.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Build the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a worker thread
    /// cannot be started.
    pub fn build(self) -> ExecutorResult<Clotho> {
        let executor = PoolExecutor::new(self.config)?;
        Ok(Clotho {
            executor: Arc::new(executor),
        })
    }
}

/// Common imports for Clotho users.
pub mod prelude {
    pub use crate::{
        make_counter, Clotho, ClothoBuilder, Counter, TaskError, TaskHandle, TaskResult,
    };
}

static GLOBAL_RUNTIME: OnceLock<ExecutorResult<Clotho>> = OnceLock::new();

/// Get or initialize the shared global runtime.
///
/// # Errors
///
/// Returns the startup error if the global runtime could not be created.
/// The failure is remembered; later calls return the same error.
pub fn global() -> ExecutorResult<&'static Clotho> {
    GLOBAL_RUNTIME
        .get_or_init(Clotho::new)
        .as_ref()
        .map_err(ExecutorError::clone)
}

/// Run `work` on the global runtime and pass its outcome to `on_complete`.
///
/// If the global runtime cannot be started, `on_complete` receives
/// [`TaskError::SpawnFailed`] on this thread.
pub fn run<T, W, C>(work: W, on_complete: C)
where
    W: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
    C: FnOnce(TaskResult<T>) + Send + 'static,
{
    match global() {
        Ok(runtime) => runtime.run(work, on_complete),
        Err(err) => {
            tracing::warn!(%err, "global runtime unavailable");
            on_complete(Err(TaskError::SpawnFailed));
        }
    }
}
