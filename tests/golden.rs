//! Golden file integration tests.
//!
//! Reads tests/testdata/fibonacci_golden.json and verifies both engines, the
//! cache and the segmented aggregator against known values.

use std::sync::Arc;

use fibmemo_core::cache::FibCache;
use fibmemo_core::calculator::{Calculator, FibCalculator, FibError};
use fibmemo_core::fastdoubling::OptimizedFastDoubling;
use fibmemo_core::iterative::fib_iterative;
use fibmemo_core::matrix::MatrixExponentiation;
use fibmemo_orchestration::SegmentedAggregator;
use fibmemo_tests::{load_golden_data, GoldenData};

fn golden() -> GoldenData {
    load_golden_data().unwrap()
}

fn engines() -> Vec<Arc<dyn Calculator>> {
    vec![
        Arc::new(FibCalculator::with_max_index(
            Arc::new(OptimizedFastDoubling::new()),
            1_000_000,
        )),
        Arc::new(FibCalculator::with_max_index(
            Arc::new(MatrixExponentiation::new()),
            1_000_000,
        )),
    ]
}

#[test]
fn golden_file_is_well_formed() {
    let data = golden();
    assert!(!data.description.is_empty());
    assert!(data.values.len() >= 10);
    assert!(data.range_sums.iter().all(|s| s.expected().is_some()));
}

#[test]
fn engines_match_golden_values() {
    let data = golden();
    for calc in engines() {
        for entry in &data.values {
            let value = calc.compute(entry.n).unwrap();
            if let Err(msg) = entry.check(&value) {
                panic!("{}: {msg}", calc.name());
            }
        }
    }
}

#[test]
fn iterative_reference_matches_golden_values() {
    for entry in golden().values.iter().filter(|e| e.n <= 10_000) {
        entry.check(&fib_iterative(entry.n)).unwrap();
    }
}

#[test]
fn cache_matches_golden_values() {
    let data = golden();
    let cache = FibCache::new(Arc::clone(&engines()[0]), 4).unwrap();
    // Two passes: the second mixes hits with recomputation after eviction.
    for _ in 0..2 {
        for entry in &data.values {
            entry.check(&cache.get_or_compute(entry.n).unwrap()).unwrap();
        }
    }
    assert!(cache.len() <= 4);
}

#[test]
fn aggregator_matches_golden_sums() {
    let data = golden();
    for size in [1, 3, 64, 1000] {
        let cache = Arc::new(FibCache::new(Arc::clone(&engines()[0]), 128).unwrap());
        let agg = SegmentedAggregator::new(cache, size, 4).unwrap();
        for sum in &data.range_sums {
            assert_eq!(
                agg.sum_range(sum.low, sum.high).unwrap(),
                sum.expected().unwrap(),
                "sum F({}..={}) with segment size {size}",
                sum.low,
                sum.high
            );
        }
    }
}

#[test]
fn boundary_above_max_index() {
    let calc = FibCalculator::with_max_index(Arc::new(OptimizedFastDoubling::new()), 93);
    assert_eq!(
        calc.compute(93).unwrap().to_string(),
        "12200160415121876738"
    );
    assert_eq!(calc.compute(94), Err(FibError::TooLarge { n: 94, max: 93 }));
}
