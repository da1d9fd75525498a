//! FibMemo: memoized fast-doubling Fibonacci numbers.

use fibmemo_lib::{app, config, errors};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = config::AppConfig::parse();

    // Logs go to stderr so stdout carries only results.
    let level = if config.verbose { Level::INFO } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = app::run(&config) {
        fibmemo_cli::ui::print_error(&format!("{e:#}"));
        std::process::exit(errors::exit_code(&e));
    }
}
