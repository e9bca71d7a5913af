//! promsnap - point-in-time Prometheus metric assertions for tests
//!
//! Wrap a [`prometheus::Registry`] in a [`TestRegistry`], register the
//! instrumented code against it, exercise that code, then take a
//! [`Snapshot`] and assert on counters, gauges, summaries and histograms by
//! name and label set.
//!
//! Assertion failures are soft: they go to a [`Reporter`] and execution
//! continues, so one test can collect several independent failures.
//!
//! ```
//! use prometheus::{IntCounterVec, Opts};
//! use promsnap::{FailureLog, TestRegistry};
//! use std::sync::Arc;
//!
//! let log = Arc::new(FailureLog::default());
//! let registry = TestRegistry::new(Arc::clone(&log));
//!
//! let requests = IntCounterVec::new(Opts::new("requests_total", "Requests"), &["method"]).unwrap();
//! registry.register(Box::new(requests.clone())).unwrap();
//! requests.with_label_values(&["GET"]).inc_by(2);
//!
//! let snapshot = registry.take_snapshot().unwrap();
//! snapshot.assert_count("requests_total", [("method", "GET")], 2.0);
//! assert!(log.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod labels;
pub mod registry;
pub mod reporter;
pub mod snapshot;
pub mod telemetry;

pub use config::RegistryConfig;
pub use error::{AssertionFailure, Error, Result};
pub use labels::LabelSet;
pub use registry::TestRegistry;
pub use reporter::{FailureLog, Reporter, SoftAssertions};
pub use snapshot::{EPSILON, Snapshot, float_equals};
