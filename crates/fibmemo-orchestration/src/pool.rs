//! Bounded worker pools.

use rayon::{ThreadPool, ThreadPoolBuilder};

use fibmemo_core::calculator::FibError;

/// Build a dedicated pool of exactly `worker_count` threads.
pub(crate) fn build_pool(worker_count: usize, label: &'static str) -> Result<ThreadPool, FibError> {
    if worker_count == 0 {
        return Err(FibError::InvalidConfiguration(
            "worker count must be at least 1".into(),
        ));
    }
    ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(move |i| format!("fibmemo-{label}-{i}"))
        .build()
        .map_err(|e| FibError::Calculation(format!("failed to create thread pool: {e}")))
}
