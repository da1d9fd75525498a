#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use fibmemo_core::cache::FibCache;
use fibmemo_core::calculator::{Calculator, FibCalculator};
use fibmemo_core::fastdoubling::OptimizedFastDoubling;

fuzz_target!(|data: &[u8]| {
    let Some((&cap, ops)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap % 8) + 1;
    let calc: Arc<dyn Calculator> = Arc::new(FibCalculator::with_max_index(
        Arc::new(OptimizedFastDoubling::new()),
        200,
    ));
    let Ok(cache) = FibCache::new(Arc::clone(&calc), capacity) else {
        return;
    };

    for &op in ops {
        let n = u64::from(op);
        match cache.get_or_compute(n) {
            Ok(value) => {
                assert_eq!(*value, calc.compute(n).unwrap());
                assert_eq!(cache.keys().first(), Some(&n));
            }
            Err(_) => assert!(n > 200),
        }
        assert!(cache.len() <= capacity);
    }
});
