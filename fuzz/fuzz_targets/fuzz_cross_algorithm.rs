#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use fibmemo_core::calculator::{Calculator, FibCalculator};
use fibmemo_core::fastdoubling::OptimizedFastDoubling;
use fibmemo_core::matrix::MatrixExponentiation;
use fibmemo_core::options::Options;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    // First 4 bytes are n, capped at 50000 for speed.
    let n = u64::from(u32::from_le_bytes([data[0], data[1], data[2], data[3]])) % 50_000;
    // Fifth byte, if any, picks a small parallel threshold to exercise rayon::join.
    let opts = Options {
        parallel_threshold: data.get(4).map_or(0, |&b| 64 * usize::from(b)),
    };

    let fast = FibCalculator::new(Arc::new(OptimizedFastDoubling::new())).with_options(opts.clone());
    let matrix = FibCalculator::new(Arc::new(MatrixExponentiation::new())).with_options(opts);

    if let (Ok(f), Ok(m)) = (fast.compute(n), matrix.compute(n)) {
        assert_eq!(f, m, "FastDoubling != Matrix at n={n}");
    }
});
