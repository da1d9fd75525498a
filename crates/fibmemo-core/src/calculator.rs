//! Calculator traits and the `FibCalculator` decorator.
//!
//! `Calculator` is the public trait consumed by the cache and orchestration.
//! `CoreCalculator` is the internal trait implemented by algorithms.
//! `FibCalculator` is a decorator that enforces the configured maximum index
//! and adds the fast path (n <= 93).

use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;

use crate::constants::{DEFAULT_MAX_INDEX, MAX_FIB_U64};
use crate::iterative::fib_u64;
use crate::options::Options;
use crate::progress::CancellationToken;

/// Error type for Fibonacci calculations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FibError {
    /// The index is negative or not representable as an index.
    #[error("invalid index {0}: must be a non-negative integer")]
    InvalidIndex(i128),

    /// The index exceeds the configured maximum.
    #[error("index {n} exceeds the configured maximum of {max}")]
    TooLarge { n: u64, max: u64 },

    /// A construction-time parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A computation exceeded its wall-clock budget.
    #[error("calculation timed out after {0:?}")]
    Timeout(Duration),

    /// Calculation was cancelled.
    #[error("calculation cancelled")]
    Cancelled,

    /// Results from different engines don't match.
    #[error("result mismatch between engines for n={n}")]
    Mismatch { n: u64 },

    /// A calculation error occurred.
    #[error("calculation error: {0}")]
    Calculation(String),
}

impl FibError {
    /// Whether this error rejects the index itself (`InvalidIndex` or `TooLarge`).
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::InvalidIndex(_) | Self::TooLarge { .. })
    }
}

/// Public trait for Fibonacci calculators.
pub trait Calculator: Send + Sync {
    /// Calculate F(n), checking `cancel` between steps.
    fn calculate(&self, n: u64, cancel: &CancellationToken) -> Result<BigUint, FibError>;

    /// Calculate F(n) without a deadline.
    fn compute(&self, n: u64) -> Result<BigUint, FibError> {
        self.calculate(n, &CancellationToken::new())
    }

    /// Largest index this calculator accepts.
    fn max_index(&self) -> u64;

    /// Get the name of this calculator.
    fn name(&self) -> &str;
}

/// Internal trait for algorithm implementations.
/// Wrapped by `FibCalculator` which adds range checks and the fast path.
pub trait CoreCalculator: Send + Sync {
    /// Perform the core calculation for large n.
    fn calculate_core(
        &self,
        n: u64,
        cancel: &CancellationToken,
        opts: &Options,
    ) -> Result<BigUint, FibError>;

    /// Get the name of this algorithm.
    fn name(&self) -> &'static str;
}

/// Decorator that wraps a `CoreCalculator` with range checks and a fast path.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fibmemo_core::calculator::{Calculator, FibCalculator, FibError};
/// use fibmemo_core::fastdoubling::OptimizedFastDoubling;
///
/// let calc = FibCalculator::with_max_index(Arc::new(OptimizedFastDoubling::new()), 1000);
/// assert_eq!(calc.compute(100).unwrap().to_string(), "354224848179261915075");
/// assert!(matches!(calc.compute(1001), Err(FibError::TooLarge { .. })));
/// ```
pub struct FibCalculator {
    inner: Arc<dyn CoreCalculator>,
    max_index: u64,
    opts: Options,
}

impl FibCalculator {
    /// Create a new `FibCalculator` with the default maximum index.
    #[must_use]
    pub fn new(inner: Arc<dyn CoreCalculator>) -> Self {
        Self::with_max_index(inner, DEFAULT_MAX_INDEX)
    }

    /// Create a new `FibCalculator` accepting indices up to `max_index`.
    #[must_use]
    pub fn with_max_index(inner: Arc<dyn CoreCalculator>, max_index: u64) -> Self {
        Self {
            inner,
            max_index,
            opts: Options::default(),
        }
    }

    /// Replace the tuning options passed to the core algorithm.
    #[must_use]
    pub fn with_options(mut self, opts: Options) -> Self {
        self.opts = opts.normalize();
        self
    }

    /// Fast path for small n (n <= 93) in native 64-bit arithmetic.
    fn calculate_small(n: u64) -> Option<BigUint> {
        fib_u64(n).map(BigUint::from)
    }
}

impl Calculator for FibCalculator {
    fn calculate(&self, n: u64, cancel: &CancellationToken) -> Result<BigUint, FibError> {
        if n > self.max_index {
            return Err(FibError::TooLarge {
                n,
                max: self.max_index,
            });
        }

        if n <= MAX_FIB_U64 {
            if let Some(value) = Self::calculate_small(n) {
                return Ok(value);
            }
        }

        cancel.check_cancelled()?;

        self.inner.calculate_core(n, cancel, &self.opts)
    }

    fn max_index(&self) -> u64 {
        self.max_index
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
