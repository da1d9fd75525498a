//! Calculator factory and registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::calculator::{Calculator, FibCalculator, FibError};
use crate::constants::DEFAULT_MAX_INDEX;
use crate::fastdoubling::OptimizedFastDoubling;
use crate::matrix::MatrixExponentiation;
use crate::options::Options;

/// Factory trait for creating calculators.
pub trait CalculatorFactory: Send + Sync {
    /// Get or create a calculator by name.
    fn get(&self, name: &str) -> Result<Arc<dyn Calculator>, FibError>;

    /// List all available calculator names.
    fn available(&self) -> Vec<&str>;
}

/// Default factory with lazy creation and cache.
pub struct DefaultFactory {
    max_index: u64,
    opts: Options,
    cache: RwLock<HashMap<String, Arc<dyn Calculator>>>,
}

impl DefaultFactory {
    /// Create a factory whose calculators accept indices up to the default maximum.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_index(DEFAULT_MAX_INDEX)
    }

    /// Create a factory whose calculators accept indices up to `max_index`.
    #[must_use]
    pub fn with_max_index(max_index: u64) -> Self {
        Self {
            max_index,
            opts: Options::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Tuning options handed to every calculator created afterwards.
    #[must_use]
    pub fn with_options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    fn create_calculator(&self, name: &str) -> Result<Arc<dyn Calculator>, FibError> {
        let calc = match name {
            "fast" | "fastdoubling" => FibCalculator::with_max_index(
                Arc::new(OptimizedFastDoubling::new()),
                self.max_index,
            ),
            "matrix" => FibCalculator::with_max_index(
                Arc::new(MatrixExponentiation::new()),
                self.max_index,
            ),
            _ => {
                return Err(FibError::InvalidConfiguration(format!(
                    "unknown calculator: {name}"
                )))
            }
        };
        Ok(Arc::new(calc.with_options(self.opts.clone())))
    }
}

impl Default for DefaultFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorFactory for DefaultFactory {
    fn get(&self, name: &str) -> Result<Arc<dyn Calculator>, FibError> {
        if let Some(calc) = self.cache.read().get(name) {
            return Ok(Arc::clone(calc));
        }

        let calc = self.create_calculator(name)?;
        self.cache
            .write()
            .insert(name.to_string(), Arc::clone(&calc));
        Ok(calc)
    }

    fn available(&self) -> Vec<&str> {
        vec!["fast", "matrix"]
    }
}
