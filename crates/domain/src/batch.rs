// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// One item of a bulk operation that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure<I, E> {
    /// The input that failed.
    pub input: I,
    /// Why it failed.
    pub reason: E,
}

/// The outcome of a best-effort bulk operation.
///
/// Items are applied independently: a failure never undoes an earlier success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult<T, I, E> {
    /// Items that were applied, in input order.
    pub succeeded: Vec<T>,
    /// Items that were rejected, in input order.
    pub failed: Vec<BatchFailure<I, E>>,
}

impl<T, I, E> BatchResult<T, I, E> {
    /// Creates an empty result.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Records an applied item.
    pub fn record_success(&mut self, item: T) {
        self.succeeded.push(item);
    }

    /// Records a rejected item.
    pub fn record_failure(&mut self, input: I, reason: E) {
        self.failed.push(BatchFailure { input, reason });
    }

    /// Returns whether every item was applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the number of items seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl<T, I, E> Default for BatchResult<T, I, E> {
    fn default() -> Self {
        Self::new()
    }
}
