//! Error types for promsnap
//!
//! [`Error`] covers structural failures (registry, configuration, an
//! inconsistent collection pass) and is returned to the caller.
//! [`AssertionFailure`] covers soft assertion failures and is handed to a
//! [`Reporter`](crate::Reporter) instead.

use crate::labels::LabelSet;
use prometheus::proto::MetricType;
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Registry error: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("Collected a metric family with an empty name")]
    UnnamedFamily,

    #[error("Metric family {name} was collected more than once")]
    DuplicateFamily { name: String },

    #[error("Metric family {family} collected label set {labels} more than once")]
    DuplicateLabelSet { family: String, labels: LabelSet },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

/// A failed metric assertion
///
/// The `Display` output is the human-readable message delivered to the
/// reporter; it always names the metric and, where one exists, both the
/// expected and the actual value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertionFailure {
    #[error("could not find {kind:?} {name} with labels {labels}")]
    NotFound {
        kind: MetricType,
        name: String,
        labels: LabelSet,
    },

    #[error("expected {name} to be of type {expected:?} but was {actual:?}")]
    TypeMismatch {
        name: String,
        expected: MetricType,
        actual: MetricType,
    },

    #[error("expected {kind:?} {name}{labels} value to be {expected} but was {actual}")]
    ValueMismatch {
        kind: MetricType,
        name: String,
        labels: LabelSet,
        expected: f64,
        actual: f64,
    },

    #[error("expected {kind:?} {name}{labels} sample sum to be {expected} but was {actual}")]
    SampleSumMismatch {
        kind: MetricType,
        name: String,
        labels: LabelSet,
        expected: f64,
        actual: f64,
    },

    #[error("expected {kind:?} {name}{labels} sample count to be {expected} but was {actual}")]
    SampleCountMismatch {
        kind: MetricType,
        name: String,
        labels: LabelSet,
        expected: u64,
        actual: u64,
    },

    #[error("expected SUMMARY {name}{labels} sample sum to be non-zero")]
    ZeroSampleSum { name: String, labels: LabelSet },
}

impl AssertionFailure {
    /// Name of the metric family the failure refers to
    pub fn metric_name(&self) -> &str {
        match self {
            Self::NotFound { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::ValueMismatch { name, .. }
            | Self::SampleSumMismatch { name, .. }
            | Self::SampleCountMismatch { name, .. }
            | Self::ZeroSampleSum { name, .. } => name,
        }
    }
}
