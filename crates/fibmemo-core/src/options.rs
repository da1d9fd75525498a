//! Engine tuning options.

use crate::constants::DEFAULT_PARALLEL_THRESHOLD;

/// Options for the core Fibonacci algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Operand size (in bits) from which a doubling step multiplies in parallel.
    pub parallel_threshold: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl Options {
    /// Normalize options, applying defaults where values are zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.parallel_threshold == 0 {
            self.parallel_threshold = DEFAULT_PARALLEL_THRESHOLD;
        }
        self
    }
}
