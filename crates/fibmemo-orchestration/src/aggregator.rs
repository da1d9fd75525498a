//! Segmented range sums: `Σ F(i)` for `i` in `[low, high]`.
//!
//! The range is split into contiguous segments that run on a bounded worker
//! pool, each querying the shared cache in increasing index order. Partial
//! sums are combined in ascending segment order. Any segment failure
//! (including a blown time budget) fails the whole range.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use fibmemo_core::cache::FibCache;
use fibmemo_core::calculator::FibError;
use fibmemo_core::config::EngineConfig;
use fibmemo_core::progress::CancellationToken;

use crate::pool::build_pool;

/// Inclusive index range `[start, end]` handled as one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    /// Number of indices in the segment.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Segments are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Split `[low, high]` into consecutive segments of at most `segment_size` indices.
///
/// # Example
/// ```
/// use fibmemo_orchestration::aggregator::{partition, Segment};
///
/// let segments = partition(0, 10, 3).unwrap();
/// assert_eq!(segments.len(), 4);
/// assert_eq!(segments[3], Segment { start: 9, end: 10 });
/// ```
pub fn partition(low: u64, high: u64, segment_size: u64) -> Result<Vec<Segment>, FibError> {
    if segment_size == 0 {
        return Err(FibError::InvalidConfiguration(
            "segment size must be at least 1".into(),
        ));
    }
    if low > high {
        return Err(FibError::InvalidConfiguration(format!(
            "range start {low} is greater than range end {high}"
        )));
    }

    let mut segments = Vec::new();
    let mut start = low;
    loop {
        let end = start.saturating_add(segment_size - 1).min(high);
        segments.push(Segment { start, end });
        if end == high {
            return Ok(segments);
        }
        start = end + 1;
    }
}

/// Computes sums of consecutive Fibonacci numbers through a shared cache.
pub struct SegmentedAggregator {
    cache: Arc<FibCache>,
    segment_size: u64,
    worker_count: usize,
    timeout: Option<Duration>,
}

impl SegmentedAggregator {
    /// Create an aggregator without a per-segment time budget.
    pub fn new(
        cache: Arc<FibCache>,
        segment_size: u64,
        worker_count: usize,
    ) -> Result<Self, FibError> {
        if segment_size == 0 {
            return Err(FibError::InvalidConfiguration(
                "segment size must be at least 1".into(),
            ));
        }
        if worker_count == 0 {
            return Err(FibError::InvalidConfiguration(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(Self {
            cache,
            segment_size,
            worker_count,
            timeout: None,
        })
    }

    /// Create an aggregator from the configured segment size, workers and timeout.
    pub fn from_config(cache: Arc<FibCache>, config: &EngineConfig) -> Result<Self, FibError> {
        config.validate()?;
        Ok(Self::new(cache, config.segment_size, config.worker_count)?
            .with_timeout(Some(config.timeout)))
    }

    /// Set (or remove) the wall-clock budget of each segment.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured segment size.
    #[must_use]
    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }

    /// `Σ F(i)` for `i` in `[low, high]`.
    ///
    /// Fails with `TooLarge` before any work if `high` exceeds the engine's
    /// maximum index, and with the first segment error otherwise. No partial
    /// total is ever returned.
    pub fn sum_range(&self, low: u64, high: u64) -> Result<BigUint, FibError> {
        self.sum_range_with(low, high, &CancellationToken::new())
    }

    /// Like `sum_range`, also stopping between indices once `cancel` fires.
    pub fn sum_range_with(
        &self,
        low: u64,
        high: u64,
        cancel: &CancellationToken,
    ) -> Result<BigUint, FibError> {
        let max = self.cache.calculator().max_index();
        if high > max {
            return Err(FibError::TooLarge { n: high, max });
        }
        let segments = partition(low, high, self.segment_size)?;
        let pool = build_pool(self.worker_count, "segment")?;

        let started = Instant::now();
        let abort = CancellationToken::new();
        let calculations = AtomicU64::new(0);

        let partials: Vec<Result<BigUint, FibError>> = pool.install(|| {
            segments
                .par_iter()
                .map(|segment| {
                    let result = self.sum_segment(*segment, cancel, &abort, &calculations);
                    if let Err(e) = &result {
                        if *e != FibError::Cancelled || !abort.is_cancelled() {
                            warn!(
                                start = segment.start,
                                end = segment.end,
                                error = %e,
                                "segment failed, aborting range"
                            );
                        }
                        abort.cancel();
                    }
                    result
                })
                .collect()
        });

        let mut total = BigUint::ZERO;
        let mut induced: Option<FibError> = None;
        for partial in partials {
            match partial {
                Ok(sum) => total += sum,
                Err(FibError::Cancelled) => {
                    induced.get_or_insert(FibError::Cancelled);
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(e) = induced {
            return Err(e);
        }

        info!(
            low,
            high,
            segments = segments.len(),
            calculations = calculations.load(Ordering::Relaxed),
            elapsed = ?started.elapsed(),
            "range sum complete"
        );
        Ok(total)
    }

    fn sum_segment(
        &self,
        segment: Segment,
        cancel: &CancellationToken,
        abort: &CancellationToken,
        calculations: &AtomicU64,
    ) -> Result<BigUint, FibError> {
        let token = match self.timeout {
            Some(budget) => abort.child_with_timeout(budget),
            None => abort.clone(),
        };

        let mut partial = BigUint::ZERO;
        for i in segment.start..=segment.end {
            cancel.check_cancelled()?;
            token.check_cancelled()?;
            partial += self.cache.get_or_compute_with(i, &token)?.as_ref();
        }
        token.check_cancelled()?;

        calculations.fetch_add(segment.len(), Ordering::Relaxed);
        debug!(start = segment.start, end = segment.end, "segment complete");
        Ok(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibmemo_core::calculator::FibCalculator;
    use fibmemo_core::fastdoubling::OptimizedFastDoubling;

    fn cache(max_index: u64) -> Arc<FibCache> {
        let calc = Arc::new(FibCalculator::with_max_index(
            Arc::new(OptimizedFastDoubling::new()),
            max_index,
        ));
        Arc::new(FibCache::new(calc, 64).unwrap())
    }

    #[test]
    fn partition_uneven() {
        let segments = partition(0, 10, 3).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment { start: 0, end: 2 },
                Segment { start: 3, end: 5 },
                Segment { start: 6, end: 8 },
                Segment { start: 9, end: 10 },
            ]
        );
    }

    #[test]
    fn partition_even_and_single() {
        assert_eq!(partition(5, 5, 100).unwrap(), vec![Segment { start: 5, end: 5 }]);
        assert_eq!(partition(1, 4, 2).unwrap().len(), 2);
        assert_eq!(partition(0, 9, 1).unwrap().len(), 10);
    }

    #[test]
    fn partition_reaches_u64_max() {
        let segments = partition(u64::MAX - 4, u64::MAX, 2).unwrap();
        assert_eq!(segments.last(), Some(&Segment { start: u64::MAX, end: u64::MAX }));
        assert_eq!(segments.iter().map(Segment::len).sum::<u64>(), 5);
    }

    #[test]
    fn partition_rejects_bad_input() {
        assert!(matches!(partition(0, 10, 0), Err(FibError::InvalidConfiguration(_))));
        assert!(matches!(partition(11, 10, 3), Err(FibError::InvalidConfiguration(_))));
    }

    #[test]
    fn sum_small_range() {
        let agg = SegmentedAggregator::new(cache(1000), 3, 2).unwrap();
        assert_eq!(agg.sum_range(0, 10).unwrap(), BigUint::from(143u32));
    }

    #[test]
    fn sum_matches_closed_form() {
        // Σ_{i=0}^{m} F(i) = F(m+2) - 1
        let cache = cache(10_000);
        let agg = SegmentedAggregator::new(Arc::clone(&cache), 37, 4).unwrap();
        let expected = cache.get_or_compute(302).unwrap().as_ref() - 1u32;
        assert_eq!(agg.sum_range(0, 300).unwrap(), expected);
    }

    #[test]
    fn sum_independent_of_segment_size() {
        let cache = cache(10_000);
        let reference = SegmentedAggregator::new(Arc::clone(&cache), 1, 1)
            .unwrap()
            .sum_range(100, 200)
            .unwrap();
        for size in [2, 7, 50, 101, 1000] {
            let agg = SegmentedAggregator::new(Arc::clone(&cache), size, 3).unwrap();
            assert_eq!(agg.sum_range(100, 200).unwrap(), reference, "size={size}");
        }
    }

    #[test]
    fn high_above_max_is_too_large() {
        let agg = SegmentedAggregator::new(cache(50), 10, 2).unwrap();
        assert_eq!(
            agg.sum_range(0, 51),
            Err(FibError::TooLarge { n: 51, max: 50 })
        );
    }

    #[test]
    fn expired_budget_fails_whole_range() {
        let agg = SegmentedAggregator::new(cache(10_000), 5, 2)
            .unwrap()
            .with_timeout(Some(Duration::ZERO));
        assert_eq!(
            agg.sum_range(0, 20),
            Err(FibError::Timeout(Duration::ZERO))
        );
    }

    #[test]
    fn generous_budget_succeeds() {
        let agg = SegmentedAggregator::new(cache(10_000), 4, 2)
            .unwrap()
            .with_timeout(Some(Duration::from_secs(60)));
        assert_eq!(agg.sum_range(0, 10).unwrap(), BigUint::from(143u32));
    }

    #[test]
    fn caller_cancellation_stops_range() {
        let agg = SegmentedAggregator::new(cache(10_000), 5, 2).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(agg.sum_range_with(0, 20, &cancel), Err(FibError::Cancelled));
    }

    #[test]
    fn invalid_construction() {
        assert!(matches!(
            SegmentedAggregator::new(cache(10), 0, 1),
            Err(FibError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SegmentedAggregator::new(cache(10), 1, 0),
            Err(FibError::InvalidConfiguration(_))
        ));
    }
}
