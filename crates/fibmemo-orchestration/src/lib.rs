//! # fibmemo-orchestration
//!
//! Segmented range sums, the concurrent benchmark harness, engine
//! selection and cross-validation.

pub mod aggregator;
pub mod calculator_selection;
pub mod harness;
pub mod interfaces;
pub mod orchestrator;
pub(crate) mod pool;

pub use aggregator::{partition, Segment, SegmentedAggregator};
pub use harness::{BenchmarkHarness, BenchmarkReport, BenchmarkResult};
pub use interfaces::{CalculationResult, NullSink, ResultSink};
pub use orchestrator::{analyze_comparison_results, execute_calculations};
