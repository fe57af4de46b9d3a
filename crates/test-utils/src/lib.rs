//! Shared helpers for `ursm-launch` integration tests.

pub mod builders;
pub mod fake_job;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::fmt;
use ursm_launch::logging::{LOG_ENV, env_filter};

/// Upper bound for any single async test, including real child processes.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Route launcher logs into the test harness.
///
/// Uses the same `URSM_LAUNCH_LOG` directives as the binary, so
/// `URSM_LAUNCH_LOG=ursm_launch::exec::process=debug cargo test -- --nocapture`
/// shows the stub scripts' output lines.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let _ = fmt()
            .with_env_filter(env_filter(None, env.as_deref()))
            .with_test_writer()
            .try_init();
    });
}

/// Fail the test instead of hanging when a launch never returns.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test did not finish within {TEST_TIMEOUT:?}"),
    }
}
