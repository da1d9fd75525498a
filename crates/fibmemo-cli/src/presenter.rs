//! Console result sink.

use std::time::Duration;

use num_bigint::BigUint;
use serde_json::{json, Value};

use fibmemo_orchestration::harness::BenchmarkReport;
use fibmemo_orchestration::interfaces::{CalculationResult, ResultSink};

use crate::output::{format_duration, format_number, format_result, format_sci, SCI_DIGITS};
use crate::ui;

/// Prints results to stdout and errors to stderr.
pub struct CLIResultSink {
    verbose: bool,
    quiet: bool,
    json: bool,
}

impl CLIResultSink {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            json: false,
        }
    }

    /// Print benchmark reports as JSON instead of a table.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn print_value_lines(&self, label: &str, value: &BigUint) {
        println!("{label} = {}", format_result(value, self.verbose));
        if value.bits() > 64 {
            println!("  ~ {} ({} bits)", format_sci(value, SCI_DIGITS), value.bits());
        }
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// JSON document for a benchmark report. Durations are in nanoseconds.
#[must_use]
pub fn benchmark_json(report: &BenchmarkReport) -> Value {
    let results: Vec<Value> = report
        .results
        .iter()
        .map(|(index, r)| {
            json!({
                "index": index,
                "count": r.count,
                "failures": r.failures,
                "mean_ns": r.mean.map(nanos),
                "min_ns": r.min.map(nanos),
                "max_ns": r.max.map(nanos),
                "error": r.error.as_ref().map(ToString::to_string),
            })
        })
        .collect();

    json!({
        "workers": report.worker_count,
        "repetitions": report.repetitions,
        "wall_time_ns": nanos(report.wall_time),
        "cache": report.cache,
        "hit_ratio": report.cache.hit_ratio(),
        "results": results,
    })
}

impl ResultSink for CLIResultSink {
    fn present_value(&self, algorithm: &str, n: u64, value: &BigUint, duration: Duration) {
        if self.quiet {
            println!("{value}");
            return;
        }

        println!("Algorithm: {algorithm}");
        println!("N: {}", format_number(n));
        println!("Duration: {}", format_duration(duration));
        self.print_value_lines(&format!("F({})", format_number(n)), value);
    }

    fn present_sum(&self, low: u64, high: u64, total: &BigUint, duration: Duration) {
        if self.quiet {
            println!("{total}");
            return;
        }

        println!(
            "Range: {}..={} ({} terms)",
            format_number(low),
            format_number(high),
            format_number(high - low + 1)
        );
        println!("Duration: {}", format_duration(duration));
        self.print_value_lines("Sum", total);
    }

    fn present_benchmark(&self, report: &BenchmarkReport) {
        if self.json {
            match serde_json::to_string_pretty(&benchmark_json(report)) {
                Ok(doc) => println!("{doc}"),
                Err(e) => ui::print_error(&format!("failed to encode report: {e}")),
            }
            return;
        }

        if !self.quiet {
            ui::print_header("Benchmark");
            println!(
                "Workers: {}  Repetitions: {}  Wall time: {}",
                report.worker_count,
                report.repetitions,
                format_duration(report.wall_time)
            );
            println!(
                "{:>14} {:>6} {:>12} {:>12} {:>12}  status",
                "index", "ok", "mean", "min", "max"
            );
        }

        let show = |d: Option<Duration>| d.map_or_else(|| "-".to_string(), format_duration);
        for (index, r) in &report.results {
            let status = match &r.error {
                Some(e) => format!("{} failed: {e}", r.failures),
                None => "OK".to_string(),
            };
            println!(
                "{:>14} {:>6} {:>12} {:>12} {:>12}  {status}",
                format_number(*index),
                r.count,
                show(r.mean),
                show(r.min),
                show(r.max),
            );
        }

        if !self.quiet {
            let c = &report.cache;
            println!(
                "Cache: {} hits, {} misses, {} evictions, {}/{} entries ({:.1}% hit ratio)",
                c.hits,
                c.misses,
                c.evictions,
                c.size,
                c.capacity,
                c.hit_ratio() * 100.0
            );
        }
    }

    fn present_comparison(&self, results: &[CalculationResult]) {
        if self.quiet {
            return;
        }

        println!("\nComparison Results:");
        println!("{:-<60}", "");
        for result in results {
            let status = match &result.outcome {
                Ok(_) => "OK".to_string(),
                Err(e) => format!("ERROR: {e}"),
            };
            println!(
                "  {:<20} {:>10} [{}]",
                result.algorithm,
                format_duration(result.duration),
                status,
            );
        }
    }
}
