//! Engine cross-validation: run several engines on one index and compare.

use std::sync::Arc;
use std::time::Instant;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, warn};

use fibmemo_core::calculator::{Calculator, FibError};
use fibmemo_core::progress::CancellationToken;

use crate::interfaces::CalculationResult;

fn run_one(calc: &Arc<dyn Calculator>, n: u64, cancel: &CancellationToken) -> CalculationResult {
    let start = Instant::now();
    let outcome = calc.calculate(n, cancel);
    let duration = start.elapsed();
    debug!(algorithm = calc.name(), n, ?duration, ok = outcome.is_ok(), "engine finished");
    CalculationResult {
        algorithm: calc.name().to_string(),
        outcome,
        duration,
    }
}

/// Execute F(n) with every given calculator, in parallel when there are several.
///
/// Results keep the order of `calculators`.
pub fn execute_calculations(
    calculators: &[Arc<dyn Calculator>],
    n: u64,
    cancel: &CancellationToken,
) -> Vec<CalculationResult> {
    if let [calc] = calculators {
        return vec![run_one(calc, n, cancel)];
    }

    calculators
        .par_iter()
        .map(|calc| run_one(calc, n, cancel))
        .collect()
}

/// Check that all successful results agree.
///
/// Fails with `Mismatch` when two engines disagree, and with the first error
/// when no engine succeeded.
pub fn analyze_comparison_results(n: u64, results: &[CalculationResult]) -> Result<(), FibError> {
    let mut valid = results.iter().filter_map(|r| r.outcome.as_ref().ok());

    let Some(first) = valid.next() else {
        return Err(results
            .iter()
            .find_map(|r| r.outcome.as_ref().err().cloned())
            .unwrap_or_else(|| FibError::Calculation("no valid results".into())));
    };

    if valid.any(|value| value != first) {
        warn!(n, "engines disagree");
        return Err(FibError::Mismatch { n });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use fibmemo_core::calculator::FibCalculator;
    use fibmemo_core::fastdoubling::OptimizedFastDoubling;
    use fibmemo_core::matrix::MatrixExponentiation;
    use num_bigint::BigUint;

    fn result(algorithm: &str, outcome: Result<BigUint, FibError>) -> CalculationResult {
        CalculationResult {
            algorithm: algorithm.into(),
            outcome,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn execute_single_calculator() {
        let calc: Arc<dyn Calculator> =
            Arc::new(FibCalculator::new(Arc::new(OptimizedFastDoubling::new())));
        let results = execute_calculations(&[calc], 100, &CancellationToken::new());
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].outcome,
            Ok(BigUint::parse_bytes(b"354224848179261915075", 10).unwrap())
        );
    }

    #[test]
    fn execute_both_engines_agree() {
        let calcs: Vec<Arc<dyn Calculator>> = vec![
            Arc::new(FibCalculator::new(Arc::new(OptimizedFastDoubling::new()))),
            Arc::new(FibCalculator::new(Arc::new(MatrixExponentiation::new()))),
        ];
        let results = execute_calculations(&calcs, 10_000, &CancellationToken::new());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].algorithm, "FastDoubling");
        assert_eq!(results[1].algorithm, "MatrixExponentiation");
        assert!(analyze_comparison_results(10_000, &results).is_ok());
    }

    #[test]
    fn analyze_matching_results() {
        let results = vec![
            result("a", Ok(BigUint::from(55u32))),
            result("b", Ok(BigUint::from(55u32))),
        ];
        assert!(analyze_comparison_results(10, &results).is_ok());
    }

    #[test]
    fn analyze_mismatched_results() {
        let results = vec![
            result("a", Ok(BigUint::from(55u32))),
            result("b", Ok(BigUint::from(56u32))),
        ];
        assert_eq!(
            analyze_comparison_results(10, &results),
            Err(FibError::Mismatch { n: 10 })
        );
    }

    #[test]
    fn analyze_ignores_failed_engines() {
        let results = vec![
            result("a", Err(FibError::Cancelled)),
            result("b", Ok(BigUint::from(55u32))),
        ];
        assert!(analyze_comparison_results(10, &results).is_ok());
    }

    #[test]
    fn analyze_no_valid_results() {
        let results = vec![result("a", Err(FibError::TooLarge { n: 11, max: 10 }))];
        assert_eq!(
            analyze_comparison_results(11, &results),
            Err(FibError::TooLarge { n: 11, max: 10 })
        );
        assert!(matches!(
            analyze_comparison_results(0, &[]),
            Err(FibError::Calculation(_))
        ));
    }
}
