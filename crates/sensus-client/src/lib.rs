//! Ward Census Service Layer
//!
//! Typed access to the census backend: daily census records, monthly
//! dashboard statistics, BOR forecasts, report exports and ward management.
//! [`ApiClient`] talks HTTP; [`MockBackend`] keeps everything in memory.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api_client;
pub mod error;
pub mod mock;
pub mod services;

pub use api_client::ApiClient;
pub use error::{ClientError, ClientResult, ErrorSeverity};
pub use mock::{FailureMode, MockBackend};
pub use services::{BangsalService, SensusService};
