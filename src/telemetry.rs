//! Logging setup for test binaries
//!
//! Snapshot capture and reported assertion failures emit `tracing` events.
//! Call [`init`] once at the start of a test to see them.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize a tracing subscriber at the given level for this crate
///
/// Only the first call per process installs a subscriber; later calls are
/// ignored, as is an unparsable level (falls back to `warn`). Output goes
/// through the test writer so it is captured per test.
///
/// # Examples
///
/// ```no_run
/// promsnap::telemetry::init("debug");
/// tracing::info!("Test started");
/// ```
pub fn init(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_new(format!("promsnap={level}"))
            .unwrap_or_else(|_| EnvFilter::new("promsnap=warn"));

        // Another subscriber may already be installed by the test harness.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
