pub mod builders;

use std::sync::Once;

use paperboy_dag::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Route crate logs into the test harness.
///
/// Output is captured per test and only shown for failures (or with
/// `--nocapture`). The filter is read from `PAPERBOY_LOG`, then `RUST_LOG`,
/// and defaults to `warn` so passing runs stay quiet:
/// `PAPERBOY_LOG=paperboy_dag::dag=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another subscriber may already be installed by the test binary.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
