//! Application entry point and dispatch.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use num_bigint::BigUint;
use tracing::{info, warn};

use fibmemo_cli::output::write_to_file;
use fibmemo_cli::presenter::CLIResultSink;
use fibmemo_cli::ui;
use fibmemo_core::cache::FibCache;
use fibmemo_core::calculator::{Calculator, FibError};
use fibmemo_core::config::EngineConfig;
use fibmemo_core::index::checked_index;
use fibmemo_core::progress::CancellationToken;
use fibmemo_core::registry::{CalculatorFactory, DefaultFactory};
use fibmemo_orchestration::aggregator::SegmentedAggregator;
use fibmemo_orchestration::calculator_selection::get_calculators_to_run;
use fibmemo_orchestration::harness::BenchmarkHarness;
use fibmemo_orchestration::interfaces::ResultSink;
use fibmemo_orchestration::orchestrator::{analyze_comparison_results, execute_calculations};

use crate::config::{AppConfig, Command};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        fibmemo_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    let Some(command) = &config.command else {
        <AppConfig as clap::CommandFactory>::command().print_help()?;
        return Ok(());
    };

    let engine = config.engine_config();
    engine.validate()?;
    let factory = DefaultFactory::with_max_index(engine.max_index).with_options(config.options());
    let sink = CLIResultSink::new(config.verbose, config.quiet);

    let cancel = CancellationToken::new();
    ctrlc_handler(cancel.clone());

    match command {
        Command::Compute { n } => run_compute(config, &engine, &factory, &sink, &cancel, *n),
        Command::Sum { low, high } => {
            run_sum(config, &engine, &factory, &sink, &cancel, *low, *high)
        }
        Command::Bench {
            indices,
            repetitions,
            json,
        } => run_bench(config, &engine, &factory, &sink.with_json(*json), indices, *repetitions),
    }
}

fn run_compute(
    config: &AppConfig,
    engine: &EngineConfig,
    factory: &dyn CalculatorFactory,
    sink: &dyn ResultSink,
    cancel: &CancellationToken,
    n: i128,
) -> Result<()> {
    let n = checked_index(n)?;
    let calculators = get_calculators_to_run(&config.algo, factory)?;
    let deadline = cancel.child_with_timeout(engine.timeout);

    let value = if let [calc] = calculators.as_slice() {
        let cache = FibCache::from_config(Arc::clone(calc), engine)?;
        let start = Instant::now();
        let value = cache.get_or_compute_with(n, &deadline)?;
        sink.present_value(calc.name(), n, &value, start.elapsed());
        value
    } else {
        let results = execute_calculations(&calculators, n, &deadline);
        sink.present_comparison(&results);
        analyze_comparison_results(n, &results)?;

        let Some((result, value)) = results
            .iter()
            .find_map(|r| r.outcome.as_ref().ok().map(|v| (r, v)))
        else {
            return Err(FibError::Calculation("no valid results".into()).into());
        };
        for failed in results.iter().filter(|r| r.outcome.is_err()) {
            warn!(algorithm = %failed.algorithm, n, "engine failed during cross-validation");
        }
        sink.present_value(&result.algorithm, n, value, result.duration);
        Arc::new(value.clone())
    };

    write_output(config, &value)
}

fn run_sum(
    config: &AppConfig,
    engine: &EngineConfig,
    factory: &dyn CalculatorFactory,
    sink: &dyn ResultSink,
    cancel: &CancellationToken,
    low: i128,
    high: i128,
) -> Result<()> {
    let (low, high) = (checked_index(low)?, checked_index(high)?);
    let cache = Arc::new(FibCache::from_config(single_calculator(config, factory)?, engine)?);
    let aggregator = SegmentedAggregator::from_config(Arc::clone(&cache), engine)?;

    let spinner = ui::spinner(&format!("Summing F({low}..={high})"), config.quiet);
    let start = Instant::now();
    let total = aggregator.sum_range_with(low, high, cancel);
    spinner.finish_and_clear();
    let total = total.with_context(|| format!("failed to sum F({low}..={high})"))?;
    let duration = start.elapsed();

    let stats = cache.stats();
    info!(hits = stats.hits, misses = stats.misses, evictions = stats.evictions, "cache usage");

    sink.present_sum(low, high, &total, duration);
    write_output(config, &total)
}

fn run_bench(
    config: &AppConfig,
    engine: &EngineConfig,
    factory: &dyn CalculatorFactory,
    sink: &dyn ResultSink,
    indices: &[i128],
    repetitions: usize,
) -> Result<()> {
    let indices = indices
        .iter()
        .map(|&n| checked_index(n))
        .collect::<Result<Vec<u64>, FibError>>()?;
    let cache = Arc::new(FibCache::from_config(single_calculator(config, factory)?, engine)?);
    let harness = BenchmarkHarness::new(cache);

    let spinner = ui::spinner("Benchmarking", config.quiet);
    let report = harness.run(&indices, repetitions, engine.worker_count);
    spinner.finish_and_clear();
    let report = report?;

    sink.present_benchmark(&report);
    Ok(())
}

/// The engine named by `--algo`; cross-validation only applies to `compute`.
fn single_calculator(
    config: &AppConfig,
    factory: &dyn CalculatorFactory,
) -> Result<Arc<dyn Calculator>, FibError> {
    if config.algo == "all" {
        return Err(FibError::InvalidConfiguration(
            "--algo all is only supported by the compute command".into(),
        ));
    }
    factory.get(&config.algo)
}

fn write_output(config: &AppConfig, value: &BigUint) -> Result<()> {
    if let Some(path) = &config.output {
        write_to_file(path, value)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        if !config.quiet {
            println!("Result written to {}", path.display());
        }
    }
    Ok(())
}

fn ctrlc_handler(cancel: CancellationToken) {
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }
}
