//! Core types and utilities for the ward census dashboard
//!
//! Holds everything that does not touch the network: the census and ward wire
//! types, the bed-occupancy indicator evaluator and its threshold tables, the
//! indicator formulas, census validation rules, configuration and logging.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod calculate;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod indicator;
pub mod standards;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use crate::config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use evaluator::{evaluate, evaluate_raw, evaluate_reading, evaluate_with};
pub use indicator::{Deviation, EvaluationResult, IndicatorCode, IndicatorReading, Level, Tier};
pub use standards::{IndicatorBands, MedicalStandards, Thresholds};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. The format is
/// `json` or anything else for human-readable output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| Error::Other(format!("logging already initialized: {e}")))
}
