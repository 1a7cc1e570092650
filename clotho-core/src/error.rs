//! Error types and handling for the Clotho runtime.

use thiserror::Error;

/// Errors delivered to a completion callback instead of a value.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Token was dropped before the work produced a value
    #[error("Task was cancelled")]
    Cancelled,
    /// Work panicked during execution
    #[error("Task panicked during execution")]
    Panicked,
    /// Executor queue was at capacity when the work was submitted
    #[error("Task failed due to resource exhaustion")]
    ResourceExhausted,
    /// Executor no longer accepts work
    #[error("Task failed to spawn")]
    SpawnFailed,
}

/// Errors that can occur while building or controlling an executor.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Executor configuration is invalid
    #[error("Invalid executor configuration: {0}")]
    InvalidConfiguration(String),
    /// The operating system refused to start a worker thread
    #[error("Failed to create thread pool: {0}")]
    ThreadPoolCreationFailed(String),
}

/// A result type for task outcomes.
pub type TaskResult<T> = Result<T, TaskError>;

/// A result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;
