//! Failure reporting for snapshot assertions
//!
//! Assertions never panic on their own. Each failure is handed to a
//! [`Reporter`], which decides what a failure means for the running test:
//! [`FailureLog`] only records, [`SoftAssertions`] records and fails the test
//! once it goes out of scope.

use crate::error::AssertionFailure;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receiver for soft assertion failures
///
/// Implementations must not abort on a single failure; several assertions
/// in one test are expected to report independently.
pub trait Reporter: Send + Sync {
    fn report(&self, failure: AssertionFailure);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, failure: AssertionFailure) {
        (**self).report(failure);
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn report(&self, failure: AssertionFailure) {
        (**self).report(failure);
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&self, failure: AssertionFailure) {
        (**self).report(failure);
    }
}

/// Reporter that records every failure in arrival order
///
/// Share it with a [`TestRegistry`](crate::TestRegistry) through an `Arc`
/// and inspect it after the assertions ran.
#[derive(Debug, Default)]
pub struct FailureLog {
    failures: Mutex<Vec<AssertionFailure>>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking test thread must not hide the failures recorded so far.
    fn lock(&self) -> MutexGuard<'_, Vec<AssertionFailure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the recorded failures
    pub fn failures(&self) -> Vec<AssertionFailure> {
        self.lock().clone()
    }

    /// Recorded failures rendered as messages
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drain the recorded failures
    pub fn take(&self) -> Vec<AssertionFailure> {
        std::mem::take(&mut *self.lock())
    }
}

impl Reporter for FailureLog {
    fn report(&self, failure: AssertionFailure) {
        tracing::warn!(
            metric = %failure.metric_name(),
            "Metric assertion failed: {}",
            failure
        );
        self.lock().push(failure);
    }
}

/// Reporter that fails the test when dropped with failures pending
///
/// Failures accumulate like in [`FailureLog`]. When the value is dropped,
/// or [`finish`](Self::finish) is called, any pending failures are raised as
/// a single panic listing every message. Nothing is raised if the thread is
/// already panicking.
///
/// # Examples
///
/// ```should_panic
/// use promsnap::{SoftAssertions, TestRegistry};
/// use std::sync::Arc;
///
/// let soft = Arc::new(SoftAssertions::new());
/// let registry = TestRegistry::new(Arc::clone(&soft));
/// let snapshot = registry.take_snapshot().unwrap();
///
/// snapshot.assert_count("jobs_total", [("queue", "high")], 1.0);
/// drop(snapshot);
/// drop(registry);
///
/// // Panics: "1 metric assertion(s) failed"
/// Arc::into_inner(soft).unwrap().finish();
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertions {
    log: FailureLog,
}

impl SoftAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures recorded so far
    pub fn failures(&self) -> Vec<AssertionFailure> {
        self.log.failures()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Raise pending failures now instead of at drop time
    pub fn finish(self) {
        self.verify();
    }

    fn verify(&self) {
        let pending = self.log.take();
        if pending.is_empty() || std::thread::panicking() {
            return;
        }

        let messages: Vec<String> = pending.iter().map(ToString::to_string).collect();
        panic!(
            "{} metric assertion(s) failed:\n  {}",
            messages.len(),
            messages.join("\n  ")
        );
    }
}

impl Reporter for SoftAssertions {
    fn report(&self, failure: AssertionFailure) {
        self.log.report(failure);
    }
}

impl Drop for SoftAssertions {
    fn drop(&mut self) {
        self.verify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelSet;
    use prometheus::proto::MetricType;

    fn not_found(name: &str) -> AssertionFailure {
        AssertionFailure::NotFound {
            kind: MetricType::COUNTER,
            name: name.to_string(),
            labels: LabelSet::new(),
        }
    }

    #[test]
    fn test_failure_log_keeps_arrival_order() {
        let log = FailureLog::new();
        log.report(not_found("first_total"));
        log.report(not_found("second_total"));

        let names: Vec<String> = log
            .failures()
            .iter()
            .map(|f| f.metric_name().to_string())
            .collect();
        assert_eq!(names, vec!["first_total", "second_total"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_failure_log_take_drains() {
        let log = FailureLog::new();
        log.report(not_found("jobs_total"));

        let taken = log.take();
        assert_eq!(taken.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_failure_log_messages_render_display() {
        let log = FailureLog::new();
        log.report(not_found("jobs_total"));
        assert_eq!(
            log.messages(),
            vec!["could not find COUNTER jobs_total with labels {}".to_string()]
        );
    }

    #[test]
    fn test_reporter_through_arc_box_and_reference() {
        fn send(reporter: impl Reporter, name: &str) {
            reporter.report(not_found(name));
        }

        let log = Arc::new(FailureLog::new());
        send(Arc::clone(&log), "a_total");
        send(log.as_ref(), "b_total");
        send(Box::new(Arc::clone(&log)), "c_total");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_soft_assertions_without_failures_do_not_panic() {
        let soft = SoftAssertions::new();
        assert!(soft.is_empty());
        soft.finish();
    }

    #[test]
    #[should_panic(expected = "2 metric assertion(s) failed")]
    fn test_soft_assertions_panic_on_drop() {
        let soft = SoftAssertions::new();
        soft.report(not_found("a_total"));
        soft.report(not_found("b_total"));
        assert_eq!(soft.failures().len(), 2);
    }

    #[test]
    #[should_panic(expected = "could not find COUNTER jobs_total")]
    fn test_soft_assertions_finish_lists_messages() {
        let soft = SoftAssertions::new();
        soft.report(not_found("jobs_total"));
        soft.finish();
    }
}
