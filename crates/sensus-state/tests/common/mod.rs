//! Shared helpers for the state tests

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
