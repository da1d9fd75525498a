//! Concurrent benchmark harness.
//!
//! Every (index, repetition) pair becomes one work item on a bounded pool of
//! `worker_count` threads sharing a single cache. Each item times exactly one
//! `get_or_compute` call, lock contention included. Failures are recorded
//! against their index; they never abort the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{info, warn};

use fibmemo_core::cache::{CacheStats, FibCache};
use fibmemo_core::calculator::FibError;

use crate::pool::build_pool;

/// Aggregate statistics for one benchmarked index.
///
/// Durations cover successful samples only and are `None` when every sample
/// failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkResult {
    /// Successful samples.
    pub count: usize,
    /// Failed samples.
    pub failures: usize,
    pub mean: Option<Duration>,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    /// First error observed for this index.
    pub error: Option<FibError>,
}

impl BenchmarkResult {
    fn new() -> Self {
        Self {
            count: 0,
            failures: 0,
            mean: None,
            min: None,
            max: None,
            error: None,
        }
    }

    fn record(&mut self, sample: Result<Duration, FibError>, total: &mut Duration) {
        match sample {
            Ok(elapsed) => {
                self.count += 1;
                *total += elapsed;
                self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
                self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
            }
            Err(e) => {
                self.failures += 1;
                self.error.get_or_insert(e);
            }
        }
    }

    /// Whether at least one sample failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failures > 0
    }
}

/// Outcome of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// Per-index statistics, ordered by index.
    pub results: BTreeMap<u64, BenchmarkResult>,
    /// Cache counters at the end of the run.
    pub cache: CacheStats,
    /// Wall-clock time of the whole run.
    pub wall_time: Duration,
    pub worker_count: usize,
    pub repetitions: usize,
}

impl BenchmarkReport {
    /// Statistics for `index`, if it was benchmarked.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&BenchmarkResult> {
        self.results.get(&index)
    }

    /// Total number of timed calls, successful or not.
    #[must_use]
    pub fn total_samples(&self) -> usize {
        self.results.values().map(|r| r.count + r.failures).sum()
    }
}

/// Drives concurrent lookups against a shared cache and collects latencies.
pub struct BenchmarkHarness {
    cache: Arc<FibCache>,
}

impl BenchmarkHarness {
    /// Create a harness over `cache`.
    #[must_use]
    pub fn new(cache: Arc<FibCache>) -> Self {
        Self { cache }
    }

    /// The cache under measurement.
    #[must_use]
    pub fn cache(&self) -> &Arc<FibCache> {
        &self.cache
    }

    /// Time `repetitions` lookups of every index in `indices` on `worker_count` threads.
    ///
    /// The cache is cleared first. Repeated indices are merged into one result.
    pub fn run(
        &self,
        indices: &[u64],
        repetitions: usize,
        worker_count: usize,
    ) -> Result<BenchmarkReport, FibError> {
        if repetitions == 0 {
            return Err(FibError::InvalidConfiguration(
                "repetitions must be at least 1".into(),
            ));
        }
        let pool = build_pool(worker_count, "bench")?;

        self.cache.clear();

        let work: Vec<u64> = indices
            .iter()
            .flat_map(|&n| std::iter::repeat(n).take(repetitions))
            .collect();

        let total_samples = work.len();
        let started = Instant::now();
        let samples: Vec<(u64, Result<Duration, FibError>)> = pool.install(|| {
            work.into_par_iter()
                .map(|n| {
                    let start = Instant::now();
                    let outcome = self.cache.get_or_compute(n);
                    (n, outcome.map(|_| start.elapsed()))
                })
                .collect()
        });
        let wall_time = started.elapsed();

        let mut totals: BTreeMap<u64, Duration> = BTreeMap::new();
        let mut results: BTreeMap<u64, BenchmarkResult> = BTreeMap::new();
        for (n, sample) in samples {
            let total = totals.entry(n).or_default();
            results
                .entry(n)
                .or_insert_with(BenchmarkResult::new)
                .record(sample, total);
        }

        for (n, result) in &mut results {
            if let Some(e) = &result.error {
                warn!(n, failures = result.failures, error = %e, "benchmark calls failed");
            }
            if result.count > 0 {
                let mean = mean_of(totals[n], result.count);
                result.mean = Some(mean);
                info!(n, samples = result.count, ?mean, "benchmark average");
            }
        }

        let cache = self.cache.stats();
        info!(
            indices = results.len(),
            samples = total_samples,
            workers = worker_count,
            ?wall_time,
            hit_ratio = cache.hit_ratio(),
            "benchmark complete"
        );

        Ok(BenchmarkReport {
            results,
            cache,
            wall_time,
            worker_count,
            repetitions,
        })
    }
}

fn mean_of(total: Duration, count: usize) -> Duration {
    let count = u128::try_from(count).unwrap_or(u128::MAX).max(1);
    Duration::from_nanos(u64::try_from(total.as_nanos() / count).unwrap_or(u64::MAX))
}
