//! Shared fixtures for monobuild's integration tests.
//!
//! - [`builders`]: in-memory graphs and on-disk monorepos in a temp dir
//! - [`fake_action`]: a `ProjectAction` that records calls instead of
//!   running scripts

pub mod builders;
pub mod fake_action;

use std::future::Future;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for a single async test step.
pub const TEST_DEADLINE: Duration = Duration::from_secs(10);

/// Route monobuild's logs to the test writer.
///
/// The filter comes from `MONOBUILD_LOG` (any `EnvFilter` directive) and
/// defaults to `monobuild=info`. Output only shows for failing tests unless
/// run with `--nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let filter = std::env::var(monobuild::logging::LOG_ENV_VAR)
        .ok()
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("monobuild=info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Await `f`, panicking if it takes longer than [`TEST_DEADLINE`].
///
/// Keeps a scheduling bug from hanging the whole test run.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_DEADLINE:?}"),
    }
}
