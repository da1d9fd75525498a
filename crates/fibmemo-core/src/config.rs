//! Engine, cache and worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calculator::FibError;
use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_INDEX, DEFAULT_SEGMENT_SIZE, DEFAULT_TIMEOUT,
};

/// Configuration shared by the cache, the aggregator and the benchmark harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest accepted index (inclusive).
    pub max_index: u64,
    /// Maximum number of memoized values.
    pub cache_capacity: usize,
    /// Maximum number of indices per aggregator segment.
    pub segment_size: u64,
    /// Number of concurrent workers.
    pub worker_count: usize,
    /// Wall-clock budget of one aggregator segment.
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_index: DEFAULT_MAX_INDEX,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            segment_size: DEFAULT_SEGMENT_SIZE,
            worker_count: default_worker_count(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Reject zero capacity, worker count or segment size.
    pub fn validate(&self) -> Result<(), FibError> {
        if self.cache_capacity == 0 {
            return Err(FibError::InvalidConfiguration(
                "cache capacity must be at least 1".into(),
            ));
        }
        if self.worker_count == 0 {
            return Err(FibError::InvalidConfiguration(
                "worker count must be at least 1".into(),
            ));
        }
        if self.segment_size == 0 {
            return Err(FibError::InvalidConfiguration(
                "segment size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Available parallelism, or 1 when it cannot be determined.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_index, DEFAULT_MAX_INDEX);
        assert!(config.worker_count >= 1);
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = EngineConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FibError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_workers_rejected() {
        let config = EngineConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FibError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_segment_size_rejected() {
        let config = EngineConfig {
            segment_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FibError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = EngineConfig {
            max_index: 5_000,
            cache_capacity: 2,
            segment_size: 3,
            worker_count: 4,
            timeout: Duration::from_millis(250),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
