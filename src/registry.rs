//! Registry wrapper that produces snapshots
//!
//! [`TestRegistry`] owns a [`prometheus::Registry`] and the reporter that
//! snapshot assertions send their failures to. Collectors register against
//! it exactly as against a bare registry.

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::reporter::Reporter;
use crate::snapshot::Snapshot;
use prometheus::Registry;
use prometheus::core::Collector;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Prometheus registry paired with a failure reporter
#[derive(Clone)]
pub struct TestRegistry {
    registry: Registry,
    reporter: Arc<dyn Reporter>,
}

impl TestRegistry {
    /// Wrap a fresh, empty registry
    pub fn new<R: Reporter + 'static>(reporter: R) -> Self {
        Self::with_registry(Registry::new(), reporter)
    }

    /// Wrap an existing registry
    ///
    /// `prometheus::Registry` clones share their collectors, so metrics
    /// registered through the original handle show up in snapshots.
    pub fn with_registry<R: Reporter + 'static>(registry: Registry, reporter: R) -> Self {
        Self {
            registry,
            reporter: Arc::new(reporter),
        }
    }

    /// Build a custom registry with a name prefix and constant labels
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or prometheus
    /// rejects the custom registry.
    pub fn from_config<R: Reporter + 'static>(config: &RegistryConfig, reporter: R) -> Result<Self> {
        config.validate()?;

        let const_labels: HashMap<String, String> = config
            .const_labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let registry = Registry::new_custom(
            config.prefix.clone(),
            (!const_labels.is_empty()).then_some(const_labels),
        )?;

        tracing::debug!(
            prefix = ?config.prefix,
            const_labels = config.const_labels.len(),
            "Created custom test registry"
        );

        Ok(Self::with_registry(registry, reporter))
    }

    /// The underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a collector
    ///
    /// # Errors
    ///
    /// Returns an error if prometheus rejects the collector (e.g. duplicate
    /// descriptors).
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<()> {
        self.registry.register(collector)?;
        Ok(())
    }

    /// Unregister a previously registered collector
    pub fn unregister(&self, collector: Box<dyn Collector>) -> Result<()> {
        self.registry.unregister(collector)?;
        Ok(())
    }

    /// Capture every registered metric family as it is right now
    ///
    /// Families that currently hold no metrics (e.g. a labelled vector
    /// nobody touched yet) are not collected and read as absent.
    ///
    /// # Errors
    ///
    /// Fails if the collection pass is inconsistent; see
    /// [`Snapshot::from_families`].
    pub fn take_snapshot(&self) -> Result<Snapshot> {
        Snapshot::capture(self.registry.gather(), Arc::clone(&self.reporter))
    }
}

impl fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRegistry").finish_non_exhaustive()
    }
}
