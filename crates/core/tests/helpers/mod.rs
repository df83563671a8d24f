//! Shared setup for the integration tests.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

/// Route the log output of the crate through the test harness; `RUST_LOG` selects the level.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

