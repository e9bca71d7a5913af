//! Configuration for custom test registries
//!
//! Parses TOML into a [`RegistryConfig`], used by
//! [`TestRegistry::from_config`](crate::TestRegistry::from_config).
//!
//! ```toml
//! prefix = "app"
//!
//! [const_labels]
//! env = "test"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Namespace prefix and constant labels applied to every collected family
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Prepended to every family name as `<prefix>_<name>`
    #[serde(default)]
    pub prefix: Option<String>,
    /// Added to the label set of every collected metric
    #[serde(default)]
    pub const_labels: BTreeMap<String, String>,
}

impl RegistryConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| Error::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        let config: Self = toml::from_str(&content).map_err(|source| Error::ConfigParseFailed {
            path: path_display.clone(),
            source,
        })?;

        config
            .validate()
            .map_err(|e| Error::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate prefix and constant labels against Prometheus naming rules
    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() {
                return Err(Error::Config(
                    "prefix must not be empty; omit it instead".to_string(),
                ));
            }
            if !is_valid_metric_name(prefix) {
                return Err(Error::Config(format!(
                    "prefix '{prefix}' is not a valid metric name prefix"
                )));
            }
        }

        for (name, value) in &self.const_labels {
            if !is_valid_label_name(name) {
                return Err(Error::Config(format!(
                    "const label name '{name}' is invalid (must match [a-zA-Z_][a-zA-Z0-9_]* and not start with '__')"
                )));
            }
            if value.is_empty() {
                return Err(Error::Config(format!(
                    "const label '{name}' must have a non-empty value"
                )));
            }
        }

        Ok(())
    }
}

impl FromStr for RegistryConfig {
    type Err = Error;

    fn from_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|source| Error::ConfigParseFailed {
            path: "<string>".to_string(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    !name.starts_with("__")
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
