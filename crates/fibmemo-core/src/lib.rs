//! # fibmemo-core
//!
//! Core library of FibMemo: the fast doubling Fibonacci engine (with a
//! matrix exponentiation substitute), range checks, cancellation, and a
//! bounded thread-safe LRU memoization cache.

pub mod cache;
pub mod calculator;
pub mod config;
pub mod constants;
pub mod fastdoubling;
pub mod index;
pub mod iterative;
pub mod matrix;
pub(crate) mod matrix_types;
pub mod options;
pub mod progress;
pub mod registry;

// Re-exports
pub use cache::{CacheStats, FibCache};
pub use calculator::{Calculator, CoreCalculator, FibCalculator, FibError};
pub use config::EngineConfig;
pub use constants::{
    exit_codes, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_INDEX, DEFAULT_PARALLEL_THRESHOLD,
    DEFAULT_SEGMENT_SIZE, DEFAULT_TIMEOUT, MAX_FIB_U64,
};
pub use options::Options;
pub use progress::CancellationToken;
pub use registry::{CalculatorFactory, DefaultFactory};

use num_bigint::BigUint;

/// Compute F(n) using the fast doubling algorithm with the default maximum index.
///
/// This is a convenience function for simple use cases. For memoization or
/// deadlines, use `FibCache` or the `Calculator` trait directly.
///
/// # Example
/// ```
/// assert_eq!(fibmemo_core::fibonacci(10).unwrap().to_string(), "55");
/// assert_eq!(fibmemo_core::fibonacci(0).unwrap().to_string(), "0");
/// assert!(fibmemo_core::fibonacci(u64::MAX).is_err());
/// ```
pub fn fibonacci(n: u64) -> Result<BigUint, FibError> {
    let calc = FibCalculator::new(std::sync::Arc::new(fastdoubling::OptimizedFastDoubling::new()));
    calc.compute(n)
}
