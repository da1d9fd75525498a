//! Constants for Fibonacci calculation thresholds and configuration.

use std::time::Duration;

/// Default threshold (in bits) above which the three products of a doubling
/// step are computed concurrently.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Maximum Fibonacci index that fits in a u64.
/// F(93) = 12200160415121876738
pub const MAX_FIB_U64: u64 = 93;

/// Default upper bound on accepted indices.
pub const DEFAULT_MAX_INDEX: u64 = 100_000_000;

/// Default number of entries kept by the memoization cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default number of indices per aggregator segment.
pub const DEFAULT_SEGMENT_SIZE: u64 = 1000;

/// Default wall-clock budget for one aggregator segment.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Exit codes returned by the `fibmemo` binary.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A segment exceeded its time budget.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// Engines disagreed during cross-validation.
    pub const ERROR_MISMATCH: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Computation cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_positive() {
        assert!(DEFAULT_MAX_INDEX > MAX_FIB_U64);
        assert!(DEFAULT_CACHE_CAPACITY > 0);
        assert!(DEFAULT_SEGMENT_SIZE > 0);
        assert!(DEFAULT_TIMEOUT > Duration::ZERO);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            exit_codes::SUCCESS,
            exit_codes::ERROR_GENERIC,
            exit_codes::ERROR_TIMEOUT,
            exit_codes::ERROR_MISMATCH,
            exit_codes::ERROR_CONFIG,
            exit_codes::ERROR_CANCELED,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
