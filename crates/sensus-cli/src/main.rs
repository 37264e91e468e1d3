//! Ward census dashboard
//!
//! Shows the monthly bed-occupancy indicators, records daily census data,
//! requests BOR forecasts and downloads reports from the census backend.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::Parser;
use sensus_cli::{App, Cli, CliError};
use sensus_client::{ApiClient, MockBackend};
use sensus_core::{Config, validation};
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Main entry point for the dashboard CLI
#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Note: .env file not loaded: {e}");
        }
    }

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Konfigurasi tidak valid: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.logging.format.clone_from(format);
    }

    if let Err(e) = sensus_core::init_logging(&config.logging) {
        eprintln!("Note: {e}");
    }
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        offline = cli.offline,
        "sensus starting"
    );

    match run(cli, config).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("{}", err.user_message());
            if let Some(hint) = err.hint() {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Pick the backend and run the command
async fn run(cli: Cli, config: Config) -> Result<String, CliError> {
    let today = validation::today();
    let command = cli.command;

    if cli.offline {
        info!("using the built-in demo backend");
        let backend = MockBackend::seeded(today);
        return App::new(config, backend, cli.json, today).run(command).await;
    }

    let backend = ApiClient::new(&config.api)?;
    App::new(config, backend, cli.json, today).run(command).await
}
