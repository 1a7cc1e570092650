//! # Completion Tokens and Handles
//!
//! A [`CompletionToken`] stands for one pending deferred operation. It owns the
//! completion callback and hands it exactly one result:
//!
//! - **Resolved once**: [`CompletionToken::resolve`] consumes the token, so a
//!   second resolution does not type-check
//! - **Never dropped silently**: a token that goes out of scope unresolved
//!   invokes its callback with [`TaskError::Cancelled`]
//!
//! A [`TaskHandle`] is the receiving half for callers that would rather wait
//! on a result than supply a callback.
//!
//! ```rust
//! use clotho_core::{CompletionToken, TaskId};
//! use std::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel();
//! let token = CompletionToken::new(TaskId::new(1), move |result| {
//!     tx.send(result).unwrap();
//! });
//!
//! token.resolve(Ok(42));
//! assert_eq!(rx.recv().unwrap(), Ok(42));
//! ```

use crate::{TaskError, TaskId, TaskResult};
use std::sync::mpsc;
use tracing::warn;

type Callback<T> = Box<dyn FnOnce(TaskResult<T>) + Send + 'static>;

/// Placeholder for a pending result, delivered to its callback exactly once.
pub struct CompletionToken<T> {
    id: TaskId,
    callback: Option<Callback<T>>,
}

impl<T> CompletionToken<T> {
    /// Create a token that delivers its result to `on_complete`.
    pub fn new<F>(id: TaskId, on_complete: F) -> Self
    where
        F: FnOnce(TaskResult<T>) + Send + 'static,
    {
        Self {
            id,
            callback: Some(Box::new(on_complete)),
        }
    }

    /// The task this token belongs to.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Deliver `result` to the callback.
    pub fn resolve(mut self, result: TaskResult<T>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T: Send + 'static> CompletionToken<T> {
    /// Create a token paired with a [`TaskHandle`] that receives its result.
    #[must_use]
    pub fn with_handle(id: TaskId) -> (Self, TaskHandle<T>) {
        let (sender, receiver) = mpsc::channel();
        let token = Self::new(id, move |result| {
            // The handle may already be gone; the result is then unobserved.
            let _ = sender.send(result);
        });
        (token, TaskHandle::new(id, receiver))
    }
}

impl<T> Drop for CompletionToken<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!(task = %self.id, "completion token dropped unresolved");
            callback(Err(TaskError::Cancelled));
        }
    }
}

impl<T> core::fmt::Debug for CompletionToken<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompletionToken")
            .field("id", &self.id)
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// A handle to a result being produced on another thread.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: TaskId,
    receiver: mpsc::Receiver<TaskResult<T>>,
}

impl<T> TaskHandle<T> {
    /// Creates a handle reading from `receiver`.
    #[must_use]
    pub fn new(id: TaskId, receiver: mpsc::Receiver<TaskResult<T>>) -> Self {
        Self { id, receiver }
    }

    /// Returns the task ID.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Waits for the task to complete and returns its result.
    ///
    /// A sender that disappears without a result is reported as
    /// [`TaskError::Cancelled`].
    pub fn join(self) -> TaskResult<T> {
        self.receiver.recv().unwrap_or(Err(TaskError::Cancelled))
    }

    /// Returns the result if it is already available, or the handle back.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` while the task is still pending.
    pub fn try_join(self) -> Result<TaskResult<T>, Self> {
        match self.receiver.try_recv() {
            Ok(result) => Ok(result),
            Err(mpsc::TryRecvError::Disconnected) => Ok(Err(TaskError::Cancelled)),
            Err(mpsc::TryRecvError::Empty) => Err(self),
        }
    }

    /// Waits up to `timeout` for the result, or hands the handle back.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` if the timeout elapses first.
    pub fn join_timeout(self, timeout: core::time::Duration) -> Result<TaskResult<T>, Self> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Ok(result),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(Err(TaskError::Cancelled)),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(self),
        }
    }
}
