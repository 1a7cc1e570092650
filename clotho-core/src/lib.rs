//! # Clotho Core
//!
//! Core abstractions and traits for the Clotho callback library.
//!
//! Named after the Fate who spins the thread, Clotho hands out small pieces of
//! private state and spins background work back into completion callbacks.
//!
//! ## Building Blocks
//!
//! - **Counters**: independent callables that own a private count
//! - **Completion tokens**: exactly-once delivery of a deferred result
//! - **Runner trait**: the seam between callers and a background executor

#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use core::fmt;

pub mod counter;
pub mod error;
pub mod executor;
pub mod task;

pub use counter::{make_counter, Counter};
pub use error::{ExecutorError, ExecutorResult, TaskError, TaskResult};
pub use executor::{CompletionRunner, ExecutorConfig, ExecutorControl, RunnerStats};
pub use task::{CompletionToken, TaskHandle};

/// A unique identifier for tasks scheduled on a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Create a new task ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.0)
    }
}
