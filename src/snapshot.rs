//! Point-in-time view of a registry and the assertions run against it
//!
//! A [`Snapshot`] is built once from one collection pass and never changes
//! afterwards. Lookups go by family name, then by exact label set.
//!
//! Absent metrics follow an implicit-zero convention: asserting a counter,
//! gauge, summary or histogram that was never collected passes when the
//! expected value (or sample count) is zero. Only
//! [`assert_summary_non_zero`](Snapshot::assert_summary_non_zero) and
//! [`assert_histogram_sample_count`](Snapshot::assert_histogram_sample_count)
//! require the metric to exist.

use crate::error::{AssertionFailure, Error, Result};
use crate::labels::LabelSet;
use crate::reporter::Reporter;
use prometheus::proto::{Metric, MetricFamily, MetricType};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Tolerance used when comparing collected floating-point values
pub const EPSILON: f64 = 1e-8;

/// Epsilon-tolerant float equality: `|a - b| < EPSILON`
///
/// Absorbs the rounding error that builds up when a value is accumulated
/// from many fractional increments. NaN is never equal to anything.
pub fn float_equals(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Immutable capture of every metric family collected at one instant
pub struct Snapshot {
    families: BTreeMap<String, MetricFamily>,
    reporter: Arc<dyn Reporter>,
}

impl Snapshot {
    /// Build a snapshot from an already gathered set of families
    ///
    /// Useful for registries not wrapped in a
    /// [`TestRegistry`](crate::TestRegistry), e.g. `prometheus::gather()`.
    ///
    /// # Errors
    ///
    /// Fails if a family has an empty name, a family name appears twice, or
    /// one family holds the same label set twice.
    pub fn from_families<R: Reporter + 'static>(
        families: Vec<MetricFamily>,
        reporter: R,
    ) -> Result<Self> {
        Self::capture(families, Arc::new(reporter))
    }

    pub(crate) fn capture(
        families: Vec<MetricFamily>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let mut by_name = BTreeMap::new();

        for family in families {
            let name = family.get_name().to_owned();
            if name.is_empty() {
                return Err(Error::UnnamedFamily);
            }
            check_unique_label_sets(&family)?;

            match by_name.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(family);
                }
                Entry::Occupied(entry) => {
                    return Err(Error::DuplicateFamily {
                        name: entry.key().clone(),
                    });
                }
            }
        }

        tracing::debug!(families = by_name.len(), "Captured metrics snapshot");

        Ok(Self {
            families: by_name,
            reporter,
        })
    }

    /// Family collected under `name`, if any
    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.get(name)
    }

    /// Collected family names in sorted order
    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Look up one metric by type, family name and exact label set
    ///
    /// Returns `None` if the family is missing or no metric carries exactly
    /// `labels`. A family of a different type is reported as a
    /// [`AssertionFailure::TypeMismatch`] and also yields `None`.
    pub fn get_metric(
        &self,
        metric_type: MetricType,
        name: &str,
        labels: impl Into<LabelSet>,
    ) -> Option<&Metric> {
        self.lookup(metric_type, name, &labels.into())
    }

    fn lookup(&self, metric_type: MetricType, name: &str, labels: &LabelSet) -> Option<&Metric> {
        let family = self.families.get(name)?;

        let actual = family.get_field_type();
        if actual != metric_type {
            tracing::debug!(
                metric = %name,
                expected = ?metric_type,
                actual = ?actual,
                "Metric family type mismatch"
            );
            self.reporter.report(AssertionFailure::TypeMismatch {
                name: name.to_owned(),
                expected: metric_type,
                actual,
            });
            return None;
        }

        family
            .get_metric()
            .iter()
            .find(|metric| labels.matches(metric.get_label()))
    }

    /// Assert the value of a counter
    ///
    /// A counter that was never collected counts as zero.
    pub fn assert_count(&self, name: &str, labels: impl Into<LabelSet>, expected: f64) {
        self.assert_value(MetricType::COUNTER, name, labels.into(), expected, |m| {
            m.get_counter().get_value()
        });
    }

    /// Assert the value of a gauge
    ///
    /// A gauge that was never collected counts as zero.
    pub fn assert_gauge(&self, name: &str, labels: impl Into<LabelSet>, expected: f64) {
        self.assert_value(MetricType::GAUGE, name, labels.into(), expected, |m| {
            m.get_gauge().get_value()
        });
    }

    /// Assert the sample sum and sample count of a summary
    ///
    /// A missing summary passes only when `expected_count` is zero. Sum and
    /// count are checked independently and both mismatches are reported.
    pub fn assert_summary(
        &self,
        name: &str,
        labels: impl Into<LabelSet>,
        expected_sum: f64,
        expected_count: u64,
    ) {
        self.assert_distribution(
            MetricType::SUMMARY,
            name,
            labels.into(),
            expected_sum,
            expected_count,
            |m| {
                let summary = m.get_summary();
                (summary.get_sample_sum(), summary.get_sample_count())
            },
        );
    }

    /// Assert the sample sum and sample count of a histogram
    ///
    /// Same conventions as [`assert_summary`](Self::assert_summary).
    pub fn assert_histogram(
        &self,
        name: &str,
        labels: impl Into<LabelSet>,
        expected_sum: f64,
        expected_count: u64,
    ) {
        self.assert_distribution(
            MetricType::HISTOGRAM,
            name,
            labels.into(),
            expected_sum,
            expected_count,
            |m| {
                let histogram = m.get_histogram();
                (histogram.get_sample_sum(), histogram.get_sample_count())
            },
        );
    }

    /// Assert that a summary exists and its sample sum is not exactly zero
    pub fn assert_summary_non_zero(&self, name: &str, labels: impl Into<LabelSet>) {
        let labels = labels.into();
        let Some(metric) = self.lookup(MetricType::SUMMARY, name, &labels) else {
            self.fail_not_found(MetricType::SUMMARY, name, labels);
            return;
        };

        if metric.get_summary().get_sample_sum() == 0.0 {
            self.reporter.report(AssertionFailure::ZeroSampleSum {
                name: name.to_owned(),
                labels,
            });
        }
    }

    /// Assert the exact sample count of an unlabelled histogram
    ///
    /// Unlike [`assert_histogram`](Self::assert_histogram), a missing
    /// histogram always fails, even when `sample_count` is zero.
    pub fn assert_histogram_sample_count(&self, name: &str, sample_count: u64) {
        let labels = LabelSet::new();
        let Some(metric) = self.lookup(MetricType::HISTOGRAM, name, &labels) else {
            self.fail_not_found(MetricType::HISTOGRAM, name, labels);
            return;
        };

        let actual = metric.get_histogram().get_sample_count();
        if actual != sample_count {
            self.reporter.report(AssertionFailure::SampleCountMismatch {
                kind: MetricType::HISTOGRAM,
                name: name.to_owned(),
                labels,
                expected: sample_count,
                actual,
            });
        }
    }

    fn assert_value(
        &self,
        kind: MetricType,
        name: &str,
        labels: LabelSet,
        expected: f64,
        value: impl Fn(&Metric) -> f64,
    ) {
        let Some(metric) = self.lookup(kind, name, &labels) else {
            if expected != 0.0 {
                self.fail_not_found(kind, name, labels);
            }
            return;
        };

        let actual = value(metric);
        if !float_equals(actual, expected) {
            self.reporter.report(AssertionFailure::ValueMismatch {
                kind,
                name: name.to_owned(),
                labels,
                expected,
                actual,
            });
        }
    }

    fn assert_distribution(
        &self,
        kind: MetricType,
        name: &str,
        labels: LabelSet,
        expected_sum: f64,
        expected_count: u64,
        samples: impl Fn(&Metric) -> (f64, u64),
    ) {
        let Some(metric) = self.lookup(kind, name, &labels) else {
            if expected_count != 0 {
                self.fail_not_found(kind, name, labels);
            }
            return;
        };

        let (actual_sum, actual_count) = samples(metric);
        if !float_equals(actual_sum, expected_sum) {
            self.reporter.report(AssertionFailure::SampleSumMismatch {
                kind,
                name: name.to_owned(),
                labels: labels.clone(),
                expected: expected_sum,
                actual: actual_sum,
            });
        }
        if actual_count != expected_count {
            self.reporter.report(AssertionFailure::SampleCountMismatch {
                kind,
                name: name.to_owned(),
                labels,
                expected: expected_count,
                actual: actual_count,
            });
        }
    }

    fn fail_not_found(&self, kind: MetricType, name: &str, labels: LabelSet) {
        self.reporter.report(AssertionFailure::NotFound {
            kind,
            name: name.to_owned(),
            labels,
        });
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn check_unique_label_sets(family: &MetricFamily) -> Result<()> {
    let mut seen = HashSet::with_capacity(family.get_metric().len());
    for metric in family.get_metric() {
        let labels = LabelSet::from_label_pairs(metric.get_label());
        if seen.contains(&labels) {
            return Err(Error::DuplicateLabelSet {
                family: family.get_name().to_owned(),
                labels,
            });
        }
        seen.insert(labels);
    }
    Ok(())
}
