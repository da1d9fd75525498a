//! Orchestration interfaces.

use std::time::Duration;

use num_bigint::BigUint;

use fibmemo_core::calculator::FibError;

use crate::harness::BenchmarkReport;

/// Consumer of computed results: printing, logging or persisting them is up
/// to the implementation.
pub trait ResultSink: Send + Sync {
    /// Present a single F(n).
    fn present_value(&self, algorithm: &str, n: u64, value: &BigUint, duration: Duration);

    /// Present the sum of F(low..=high).
    fn present_sum(&self, low: u64, high: u64, total: &BigUint, duration: Duration);

    /// Present a benchmark report.
    fn present_benchmark(&self, report: &BenchmarkReport);

    /// Present a cross-validation run.
    fn present_comparison(&self, results: &[CalculationResult]);
}

/// Result of running one engine for one index.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    /// Algorithm name.
    pub algorithm: String,
    /// The computed value or a structured error.
    pub outcome: Result<BigUint, FibError>,
    /// Computation duration.
    pub duration: Duration,
}

/// Sink that discards everything.
pub struct NullSink;

impl ResultSink for NullSink {
    fn present_value(&self, _algorithm: &str, _n: u64, _value: &BigUint, _duration: Duration) {}
    fn present_sum(&self, _low: u64, _high: u64, _total: &BigUint, _duration: Duration) {}
    fn present_benchmark(&self, _report: &BenchmarkReport) {}
    fn present_comparison(&self, _results: &[CalculationResult]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink() {
        let sink = NullSink;
        sink.present_value("FastDoubling", 10, &BigUint::from(55u32), Duration::ZERO);
        sink.present_sum(0, 10, &BigUint::from(143u32), Duration::ZERO);
    }

    #[test]
    fn calculation_result() {
        let result = CalculationResult {
            algorithm: "FastDoubling".into(),
            outcome: Ok(BigUint::from(55u32)),
            duration: Duration::from_millis(100),
        };
        assert_eq!(result.algorithm, "FastDoubling");
        assert!(result.outcome.is_ok());
    }
}
