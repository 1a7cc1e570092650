//! Runner trait definitions and configuration.

use crate::{CompletionToken, ExecutorError, ExecutorResult, TaskHandle, TaskId, TaskResult};

/// Deferred completion capabilities.
///
/// Implementors only provide [`schedule`](CompletionRunner::schedule) and
/// [`next_task_id`](CompletionRunner::next_task_id); the callback and handle
/// flavours are built on top of them.
pub trait CompletionRunner: Send + Sync + 'static {
    /// Allocate the id for the next scheduled task.
    fn next_task_id(&self) -> TaskId;

    /// Queue `work` for background execution and resolve `token` with its
    /// outcome.
    ///
    /// # Behavior Guarantees
    /// - Returns without waiting for `work`
    /// - `token` is resolved exactly once, either by a worker or, when the
    ///   work cannot be queued, on the calling thread with an error
    fn schedule<T, W>(&self, work: W, token: CompletionToken<T>)
    where
        W: FnOnce() -> T + Send + 'static,
        T: Send + 'static;

    /// Run `work` in the background and pass its result to `on_complete`.
    fn run<T, W, C>(&self, work: W, on_complete: C)
    where
        W: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
        C: FnOnce(TaskResult<T>) + Send + 'static,
    {
        let token = CompletionToken::new(self.next_task_id(), on_complete);
        self.schedule(work, token);
    }

    /// Run `work` in the background and return a handle to its result.
    fn submit<T, W>(&self, work: W) -> TaskHandle<T>
    where
        W: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (token, handle) = CompletionToken::with_handle(self.next_task_id());
        self.schedule(work, token);
        handle
    }

    /// Run `work` and `on_complete` on the calling thread before returning.
    fn run_inline<T, W, C>(&self, work: W, on_complete: C)
    where
        W: FnOnce() -> T,
        C: FnOnce(TaskResult<T>),
    {
        on_complete(Ok(work()));
    }
}

/// Executor lifecycle and control operations.
pub trait ExecutorControl: Send + Sync + 'static {
    /// Stop accepting work, drain the queue and join the workers.
    ///
    /// # Behavior Guarantees
    /// - Work already queued still runs and completes
    /// - Idempotent operation
    fn shutdown(&self);

    /// Check if the executor has begun shutting down.
    fn is_shutting_down(&self) -> bool;

    /// Get the number of worker threads.
    fn worker_count(&self) -> usize;

    /// Get the number of queued jobs not yet picked up by a worker.
    fn load(&self) -> usize;

    /// Snapshot of the execution counters.
    fn stats(&self) -> RunnerStats;
}

/// Counters describing what a runner has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerStats {
    /// Jobs accepted onto the queue
    pub submitted: u64,
    /// Jobs whose work returned a value
    pub completed: u64,
    /// Jobs whose work panicked
    pub panicked: u64,
    /// Jobs refused at submission
    pub rejected: u64,
}

impl RunnerStats {
    /// Jobs accepted but not yet finished.
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed)
            .saturating_sub(self.panicked)
    }
}

/// Configuration for the background executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of worker threads
    pub worker_threads: usize,
    /// Maximum number of queued jobs before submissions are refused
    pub queue_capacity: usize,
    /// Thread name prefix for worker threads
    pub thread_name_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            queue_capacity: 8192,
            thread_name_prefix: "clotho-worker".into(),
        }
    }
}

impl ExecutorConfig {
    /// Check the configuration before any thread is started.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidConfiguration`] for zero workers or a
    /// zero-capacity queue.
    pub fn validate(&self) -> ExecutorResult<()> {
        if self.worker_threads == 0 {
            return Err(ExecutorError::InvalidConfiguration(
                "worker_threads must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ExecutorError::InvalidConfiguration(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
