//! Terminal front end for the ward census dashboard
//!
//! The `sensus` binary parses [`cli::Cli`], loads configuration, picks a
//! backend (the HTTP client or the in-memory demo backend) and hands the
//! command to [`App`]. Handlers return their output as text so they can be
//! driven from tests.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;

pub use cli::{Cli, Commands};
pub use commands::App;
pub use error::{CliError, CliResult};
