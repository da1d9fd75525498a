//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use fibmemo_core::config::{default_worker_count, EngineConfig};
use fibmemo_core::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_INDEX, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_SEGMENT_SIZE,
};
use fibmemo_core::options::Options;

/// FibMemo: memoized fast-doubling Fibonacci numbers, range sums and latency benchmarks.
#[derive(Parser, Debug)]
#[command(name = "fibmemo", version, about)]
pub struct AppConfig {
    /// Largest accepted index.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INDEX, env = "FIBMEMO_MAX_INDEX")]
    pub max_index: u64,

    /// Maximum number of memoized values.
    #[arg(long, global = true, default_value_t = DEFAULT_CACHE_CAPACITY, env = "FIBMEMO_CACHE_CAPACITY")]
    pub cache_capacity: usize,

    /// Maximum number of indices per range-sum segment.
    #[arg(long, global = true, default_value_t = DEFAULT_SEGMENT_SIZE, env = "FIBMEMO_SEGMENT_SIZE")]
    pub segment_size: u64,

    /// Number of worker threads (defaults to available parallelism).
    #[arg(long, global = true, env = "FIBMEMO_WORKERS")]
    pub workers: Option<usize>,

    /// Time budget (e.g., "30s", "5m", "250ms"): per segment for `sum`, per run for `compute`.
    #[arg(long, global = true, default_value = "5m", value_parser = parse_duration, env = "FIBMEMO_TIMEOUT")]
    pub timeout: Duration,

    /// Engine to use: fast, matrix, or all (cross-validates every engine).
    #[arg(long, global = true, default_value = "fast", env = "FIBMEMO_ALGO")]
    pub algo: String,

    /// Parallel multiplication threshold in bits.
    #[arg(long, global = true, default_value_t = DEFAULT_PARALLEL_THRESHOLD, env = "FIBMEMO_THRESHOLD")]
    pub threshold: usize,

    /// Verbose output (full digits, info-level logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only output the number).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write the computed value or sum to this file.
    #[arg(short, long, global = true, env = "FIBMEMO_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compute F(n).
    Compute {
        /// Index of the Fibonacci number.
        #[arg(allow_negative_numbers = true)]
        n: i128,
    },
    /// Sum F(low) + ... + F(high).
    Sum {
        /// First index of the range.
        #[arg(allow_negative_numbers = true)]
        low: i128,
        /// Last index of the range (inclusive).
        #[arg(allow_negative_numbers = true)]
        high: i128,
    },
    /// Time repeated cold-cache lookups of the given indices under concurrent load.
    Bench {
        /// Indices to benchmark.
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        indices: Vec<i128>,
        /// Timed calls per index.
        #[arg(short, long, default_value_t = 5, env = "FIBMEMO_REPETITIONS")]
        repetitions: usize,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Engine configuration assembled from the flags.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_index: self.max_index,
            cache_capacity: self.cache_capacity,
            segment_size: self.segment_size,
            worker_count: self.workers.unwrap_or_else(default_worker_count),
            timeout: self.timeout,
        }
    }

    /// Engine tuning options.
    #[must_use]
    pub fn options(&self) -> Options {
        Options {
            parallel_threshold: self.threshold,
        }
        .normalize()
    }
}

/// Parse a duration string like "5m", "1h", "30s", "250ms" or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let invalid = || format!("invalid duration: {s:?}");
    let number = |digits: &str| digits.parse::<u64>().map_err(|_| invalid());

    if let Some(ms) = s.strip_suffix("ms") {
        Ok(Duration::from_millis(number(ms)?))
    } else if let Some(mins) = s.strip_suffix('m') {
        Ok(Duration::from_secs(number(mins)?.saturating_mul(60)))
    } else if let Some(hours) = s.strip_suffix('h') {
        Ok(Duration::from_secs(number(hours)?.saturating_mul(3600)))
    } else if let Some(secs) = s.strip_suffix('s') {
        Ok(Duration::from_secs(number(secs)?))
    } else {
        Ok(Duration::from_secs(number(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn parse_duration_formats() {
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("45"), Ok(Duration::from_secs(45)));
    }

    #[test]
    fn parse_duration_ms() {
        assert_eq!(parse_duration("1ms"), Ok(Duration::from_millis(1)));
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn compute_defaults() {
        let config = parse(&["fibmemo", "compute", "100"]);
        assert_eq!(config.command, Some(Command::Compute { n: 100 }));
        assert_eq!(config.algo, "fast");
        assert_eq!(config.max_index, DEFAULT_MAX_INDEX);
        assert_eq!(config.timeout, Duration::from_secs(300));
        let engine = config.engine_config();
        assert_eq!(engine.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(engine.worker_count >= 1);
    }

    #[test]
    fn negative_index_is_parsed() {
        let config = parse(&["fibmemo", "compute", "-5"]);
        assert_eq!(config.command, Some(Command::Compute { n: -5 }));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let config = parse(&[
            "fibmemo", "sum", "0", "10", "--segment-size", "3", "--workers", "2", "--timeout",
            "250ms",
        ]);
        assert_eq!(config.command, Some(Command::Sum { low: 0, high: 10 }));
        let engine = config.engine_config();
        assert_eq!(engine.segment_size, 3);
        assert_eq!(engine.worker_count, 2);
        assert_eq!(engine.timeout, Duration::from_millis(250));
    }

    #[test]
    fn bench_arguments() {
        let config = parse(&["fibmemo", "bench", "10", "1000", "-r", "3", "--json"]);
        assert_eq!(
            config.command,
            Some(Command::Bench {
                indices: vec![10, 1000],
                repetitions: 3,
                json: true,
            })
        );
    }

    #[test]
    fn bench_requires_indices() {
        assert!(AppConfig::try_parse_from(["fibmemo", "bench"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(AppConfig::try_parse_from(["fibmemo", "-q", "-v", "compute", "1"]).is_err());
    }
}
