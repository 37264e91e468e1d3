//! Ward Census Dashboard State
//!
//! Framework-independent state for the dashboard front end: a cancellable
//! data-fetch controller, paged fetches and form state with eager validation.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod census;
pub mod fetch;
pub mod form;
pub mod pagination;

pub use census::census_form;
pub use fetch::{FetchHandle, FetchOptions, FetchState, Refetch};
pub use form::{ChangeEvent, FieldValue, FormPhase, FormState, InputKind, SubmitOutcome, Values};
pub use pagination::{PaginatedFetch, Pagination};
