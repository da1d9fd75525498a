//! Bounded, thread-safe LRU memoization in front of a `Calculator`.
//!
//! The recency list and the key map live in one `LruCache` behind a single
//! `parking_lot::Mutex`; every lookup that reorders recency takes the lock.
//! Computation on a miss runs outside the lock, so two callers racing on the
//! same uncached index may both compute it, but only one entry is stored.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use num_bigint::BigUint;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::calculator::{Calculator, FibError};
use crate::config::EngineConfig;
use crate::progress::CancellationToken;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0.0 when nothing was looked up.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState {
    entries: LruCache<u64, Arc<BigUint>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheState {
    fn lookup(&mut self, n: u64) -> Option<Arc<BigUint>> {
        if let Some(value) = self.entries.get(&n) {
            self.hits += 1;
            Some(Arc::clone(value))
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert unless a value for `n` is already present; returns the stored value.
    fn insert(&mut self, n: u64, value: Arc<BigUint>) -> Arc<BigUint> {
        if let Some(existing) = self.entries.get(&n) {
            return Arc::clone(existing);
        }
        if let Some((evicted, _)) = self.entries.push(n, Arc::clone(&value)) {
            self.evictions += 1;
            debug!(evicted, inserted = n, "cache eviction");
        }
        value
    }
}

/// Memoizing wrapper around a calculator with least-recently-used eviction.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fibmemo_core::cache::FibCache;
/// use fibmemo_core::calculator::FibCalculator;
/// use fibmemo_core::fastdoubling::OptimizedFastDoubling;
///
/// let calc = Arc::new(FibCalculator::new(Arc::new(OptimizedFastDoubling::new())));
/// let cache = FibCache::new(calc, 2).unwrap();
/// assert_eq!(cache.get_or_compute(10).unwrap().to_string(), "55");
/// assert_eq!(cache.stats().misses, 1);
/// assert_eq!(cache.get_or_compute(10).unwrap().to_string(), "55");
/// assert_eq!(cache.stats().hits, 1);
/// ```
pub struct FibCache {
    calculator: Arc<dyn Calculator>,
    state: Mutex<CacheState>,
}

impl FibCache {
    /// Create a cache holding at most `capacity` values.
    pub fn new(calculator: Arc<dyn Calculator>, capacity: usize) -> Result<Self, FibError> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            FibError::InvalidConfiguration("cache capacity must be at least 1".into())
        })?;
        Ok(Self {
            calculator,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        })
    }

    /// Create a cache sized by `config.cache_capacity`.
    pub fn from_config(
        calculator: Arc<dyn Calculator>,
        config: &EngineConfig,
    ) -> Result<Self, FibError> {
        config.validate()?;
        Self::new(calculator, config.cache_capacity)
    }

    /// Return F(n), computing and storing it on a miss.
    pub fn get_or_compute(&self, n: u64) -> Result<Arc<BigUint>, FibError> {
        self.get_or_compute_with(n, &CancellationToken::new())
    }

    /// Like `get_or_compute`, with a cancellation token for the computation.
    ///
    /// Errors from the calculator are returned unchanged and never cached.
    pub fn get_or_compute_with(
        &self,
        n: u64,
        cancel: &CancellationToken,
    ) -> Result<Arc<BigUint>, FibError> {
        let max = self.calculator.max_index();
        if n > max {
            return Err(FibError::TooLarge { n, max });
        }

        if let Some(value) = self.state.lock().lookup(n) {
            trace!(n, "cache hit");
            return Ok(value);
        }

        trace!(n, calculator = self.calculator.name(), "cache miss");
        let value = Arc::new(self.calculator.calculate(n, cancel)?);
        Ok(self.state.lock().insert(n, value))
    }

    /// Look up F(n) without computing it, marking it most recently used.
    pub fn get(&self, n: u64) -> Option<Arc<BigUint>> {
        self.state.lock().lookup(n)
    }

    /// Store a value for `n`, replacing any previous one, and mark it most recently used.
    pub fn put(&self, n: u64, value: BigUint) {
        let mut state = self.state.lock();
        state.entries.pop(&n);
        state.insert(n, Arc::new(value));
    }

    /// Whether `n` is cached, without touching recency.
    pub fn contains(&self, n: u64) -> bool {
        self.state.lock().entries.contains(&n)
    }

    /// Cached keys from most to least recently used.
    pub fn keys(&self) -> Vec<u64> {
        self.state.lock().entries.iter().map(|(k, _)| *k).collect()
    }

    /// Remove every entry and reset the counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        state.evictions = 0;
        debug!("cache cleared");
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the cache holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached values.
    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            size: state.entries.len(),
            capacity: state.entries.cap().get(),
        }
    }

    /// The calculator consulted on a miss.
    pub fn calculator(&self) -> &Arc<dyn Calculator> {
        &self.calculator
    }
}
