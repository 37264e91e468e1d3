//! Shared helpers for the command tests

use clap::Parser;
use sensus_cli::{App, Cli, CliResult};
use sensus_client::MockBackend;
use sensus_core::Config;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Parse `args` as if typed after `sensus` and run them against `backend`
pub async fn run_with(backend: &MockBackend, config: Config, args: &[&str]) -> CliResult<String> {
    init_test_logging();
    let cli = Cli::try_parse_from(std::iter::once("sensus").chain(args.iter().copied()))
        .expect("arguments should parse");
    let today = sensus_core::validation::today();
    App::new(config, backend.clone(), cli.json, today)
        .run(cli.command)
        .await
}

/// Run against `backend` with the default configuration
pub async fn run(backend: &MockBackend, args: &[&str]) -> CliResult<String> {
    run_with(backend, Config::default(), args).await
}
