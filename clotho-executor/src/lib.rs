//! Worker pool executor for the Clotho callback library.
//!
//! [`PoolExecutor`] owns a fixed set of named worker threads fed from a single
//! bounded queue. Every submission carries a [`CompletionToken`], and the
//! pool guarantees that token is resolved exactly once:
//!
//! - by a worker, with the work's value or [`TaskError::Panicked`];
//! - on the submitting thread, with [`TaskError::ResourceExhausted`] when the
//!   queue is full or [`TaskError::SpawnFailed`] after shutdown.
//!
//! ```rust
//! use clotho_core::{CompletionRunner, ExecutorConfig, ExecutorControl};
//! use clotho_executor::PoolExecutor;
//!
//! let pool = PoolExecutor::new(ExecutorConfig::default()).unwrap();
//! let handle = pool.submit(|| 6 * 7);
//! assert_eq!(handle.join(), Ok(42));
//! pool.shutdown();
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

use clotho_core::{
    CompletionRunner, CompletionToken, ExecutorConfig, ExecutorControl, ExecutorError,
    ExecutorResult, RunnerStats, TaskError, TaskId,
};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Condvar, Mutex, PoisonError, RwLock,
    },
    thread::{self, JoinHandle, ThreadId},
};
use tracing::{debug, info, warn};

/// A queued unit of work together with the token it must resolve.
trait BoxedJob: Send + 'static {
    fn id(&self) -> TaskId;

    /// Run the work and resolve the token with its outcome.
    fn execute_boxed(self: Box<Self>, stats: &Stats);

    /// Resolve the token with `error` without running the work.
    fn reject(self: Box<Self>, error: TaskError);
}

struct Job<W, T> {
    work: W,
    token: CompletionToken<T>,
}

impl<W, T> BoxedJob for Job<W, T>
where
    W: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    fn id(&self) -> TaskId {
        self.token.id()
    }

    fn execute_boxed(self: Box<Self>, stats: &Stats) {
        let Job { work, token } = *self;
        let id = token.id();
        debug!(task = %id, "running work");

        let result = match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => {
                stats.completed.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            }
            Err(_) => {
                stats.panicked.fetch_add(1, Ordering::Relaxed);
                warn!(task = %id, "work panicked");
                Err(TaskError::Panicked)
            }
        };

        // The callback belongs to the caller; a panic in it must not take the
        // worker down with it.
        if panic::catch_unwind(AssertUnwindSafe(|| token.resolve(result))).is_err() {
            warn!(task = %id, "completion callback panicked");
        }
    }

    fn reject(self: Box<Self>, error: TaskError) {
        self.token.resolve(Err(error));
    }
}

#[derive(Default)]
struct Stats {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
    rejected: AtomicU64,
}

impl Stats {
    fn snapshot(&self) -> RunnerStats {
        RunnerStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Number of worker threads still running, independent of who holds their
/// join handles.
#[derive(Default)]
struct LiveWorkers {
    count: Mutex<usize>,
    exited: Condvar,
}

impl LiveWorkers {
    fn enter(self: &Arc<Self>) -> WorkerExit {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        WorkerExit(self.clone())
    }

    fn wait_all_exited(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .exited
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Held by a worker for its whole life; released even if the thread unwinds
/// or never starts.
struct WorkerExit(Arc<LiveWorkers>);

impl Drop for WorkerExit {
    fn drop(&mut self) {
        let mut count = self.0.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count -= 1;
        if *count == 0 {
            self.0.exited.notify_all();
        }
    }
}

/// A fixed-size pool of worker threads delivering deferred completions.
pub struct PoolExecutor {
    sender: RwLock<Option<Sender<Box<dyn BoxedJob>>>>,
    receiver: Receiver<Box<dyn BoxedJob>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_ids: Vec<ThreadId>,
    live: Arc<LiveWorkers>,
    worker_count: usize,
    shutting_down: AtomicBool,
    next_id: AtomicU64,
    stats: Arc<Stats>,
}

impl PoolExecutor {
    /// Start a pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidConfiguration`] if the configuration
    /// fails validation, or [`ExecutorError::ThreadPoolCreationFailed`] if a
    /// worker thread cannot be started. Workers started before the failure
    /// are joined before returning.
    pub fn new(config: ExecutorConfig) -> ExecutorResult<Self> {
        config.validate()?;

        let (sender, receiver) = channel::bounded::<Box<dyn BoxedJob>>(config.queue_capacity);
        let stats = Arc::new(Stats::default());
        let live = Arc::new(LiveWorkers::default());
        let mut workers = Vec::with_capacity(config.worker_threads);

        for index in 0..config.worker_threads {
            let receiver = receiver.clone();
            let stats = stats.clone();
            let exit = live.enter();
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name_prefix))
                .spawn(move || {
                    let _exit = exit;
                    worker_loop(&receiver, &stats);
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    drop(sender);
                    join_workers(workers, thread::current().id());
                    return Err(ExecutorError::ThreadPoolCreationFailed(err.to_string()));
                }
            }
        }

        info!(
            workers = config.worker_threads,
            queue_capacity = config.queue_capacity,
            "worker pool started"
        );

        let worker_ids = workers.iter().map(|handle| handle.thread().id()).collect();

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            worker_ids,
            live,
            worker_count: config.worker_threads,
            shutting_down: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            stats,
        })
    }

    fn reject(&self, job: Box<dyn BoxedJob>, error: TaskError) {
        self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(task = %job.id(), %error, "work rejected");
        job.reject(error);
    }
}

/// Join every handle except `current`'s own, returning how many workers
/// ended in a panic.
fn join_workers(handles: Vec<JoinHandle<()>>, current: ThreadId) -> usize {
    let mut abnormal = 0;
    for handle in handles {
        // A callback may trigger shutdown from inside a worker.
        if handle.thread().id() == current {
            continue;
        }
        if handle.join().is_err() {
            abnormal += 1;
            warn!("worker thread terminated abnormally");
        }
    }
    abnormal
}

fn worker_loop(receiver: &Receiver<Box<dyn BoxedJob>>, stats: &Stats) {
    // recv fails only once every sender is gone and the queue is drained.
    while let Ok(job) = receiver.recv() {
        job.execute_boxed(stats);
    }
    debug!("worker exiting");
}

impl CompletionRunner for PoolExecutor {
    fn next_task_id(&self) -> TaskId {
        TaskId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn schedule<T, W>(&self, work: W, token: CompletionToken<T>)
    where
        W: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let job: Box<dyn BoxedJob> = Box::new(Job { work, token });
        let id = job.id();

        let refused = {
            let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                None => Some((job, TaskError::SpawnFailed)),
                Some(sender) => match sender.try_send(job) {
                    Ok(()) => None,
                    Err(TrySendError::Full(job)) => Some((job, TaskError::ResourceExhausted)),
                    Err(TrySendError::Disconnected(job)) => Some((job, TaskError::SpawnFailed)),
                },
            }
        };

        match refused {
            None => {
                self.stats.submitted.fetch_add(1, Ordering::Relaxed);
                debug!(task = %id, "work queued");
            }
            Some((job, error)) => self.reject(job, error),
        }
    }
}

impl ExecutorControl for PoolExecutor {
    fn shutdown(&self) {
        if !self.shutting_down.swap(true, Ordering::AcqRel) {
            info!("worker pool shutting down");
        }

        // Dropping the only sender lets workers drain the queue and exit.
        self.sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        let current = thread::current().id();
        join_workers(handles, current);

        // An earlier caller may hold the remaining handles, or be a worker
        // that never joins itself; wait on the live count instead.
        if self.worker_ids.contains(&current) {
            debug!("shutdown requested from a worker; queue drains in the background");
            return;
        }
        self.live.wait_all_exited();
    }

    fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn load(&self) -> usize {
        self.receiver.len()
    }

    fn stats(&self) -> RunnerStats {
        self.stats.snapshot()
    }
}

impl Drop for PoolExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl core::fmt::Debug for PoolExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolExecutor")
            .field("worker_count", &self.worker_count)
            .field("load", &self.load())
            .field("shutting_down", &self.is_shutting_down())
            .finish_non_exhaustive()
    }
}
