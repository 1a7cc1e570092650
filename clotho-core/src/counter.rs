//! Counters that own a private, monotonically increasing count.
//!
//! Each call to [`make_counter`] produces a fresh [`Counter`] with its own
//! state. Invoking a counter bumps that state and returns the new value; no
//! two counters ever observe each other.
//!
//! ```rust
//! use clotho_core::make_counter;
//!
//! let mut c = make_counter();
//! assert_eq!(c.call("a"), 1);
//! assert_eq!(c.call("b"), 2);
//!
//! let mut d = make_counter();
//! assert_eq!(d.call("x"), 1);
//! ```

use tracing::debug;

/// A callable holding a private count.
///
/// `call` takes `&mut self`, so a counter cannot be invoked from two threads
/// at once without the caller adding its own synchronisation.
#[derive(Debug, Default)]
pub struct Counter {
    count: u64,
}

impl Counter {
    /// Increment the count and return the new value.
    ///
    /// The label is only reported in the trace event; it does not partition
    /// state.
    pub fn call(&mut self, label: &str) -> u64 {
        self.count += 1;
        debug!(count = self.count, label, "counter invoked");
        self.count
    }

    /// Current count without incrementing it.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Turn the counter into a plain closure.
    pub fn into_fn(mut self) -> impl FnMut(&str) -> u64 {
        move |label: &str| self.call(label)
    }
}

/// Create an independent counter starting at zero.
#[must_use]
pub fn make_counter() -> Counter {
    Counter::default()
}
