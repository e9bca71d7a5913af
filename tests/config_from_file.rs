//! Integration tests for loading registry configuration from disk
//!
//! Covers the full path: file -> parse -> validate -> custom registry.

use prometheus::IntCounter;
use promsnap::{Error, FailureLog, RegistryConfig, TestRegistry};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Helper to create a temporary config file with given TOML content
fn create_temp_config(toml_content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(toml_content.as_bytes())
        .expect("Failed to write temp file");
    temp_file.flush().expect("Failed to flush temp file");
    temp_file
}

#[test]
fn test_config_from_file_builds_prefixed_registry() {
    let temp_file = create_temp_config(
        r#"
prefix = "svc"

[const_labels]
instance = "test_1"
"#,
    );
    let config = RegistryConfig::from_file(temp_file.path()).expect("valid config file");

    let log = Arc::new(FailureLog::new());
    let registry = TestRegistry::from_config(&config, Arc::clone(&log)).expect("registry");
    let counter = IntCounter::new("restarts_total", "Restarts").expect("valid counter");
    registry
        .register(Box::new(counter.clone()))
        .expect("registration");
    counter.inc();

    let snapshot = registry.take_snapshot().expect("snapshot");
    snapshot.assert_count("svc_restarts_total", [("instance", "test_1")], 1.0);
    assert!(log.is_empty(), "unexpected failures: {:?}", log.messages());
}

#[test]
fn test_config_from_file_missing_file() {
    let result = RegistryConfig::from_file("/nonexistent/promsnap/registry.toml");
    match result {
        Err(Error::ConfigFileRead { path, .. }) => {
            assert!(path.contains("registry.toml"));
        }
        other => panic!("expected ConfigFileRead, got {other:?}"),
    }
}

#[test]
fn test_config_from_file_parse_error_names_path() {
    let temp_file = create_temp_config("prefix = [");
    let err = RegistryConfig::from_file(temp_file.path()).expect_err("malformed TOML");

    assert!(matches!(err, Error::ConfigParseFailed { .. }));
    let path = temp_file.path().display().to_string();
    assert!(err.to_string().contains(&path), "error should name {path}: {err}");
}

#[test]
fn test_config_from_file_validation_error_has_reason() {
    let temp_file = create_temp_config(
        r#"
[const_labels]
"bad-name" = "x"
"#,
    );
    let err = RegistryConfig::from_file(temp_file.path()).expect_err("invalid label name");

    match err {
        Error::ConfigValidationFailed { reason, .. } => {
            assert!(reason.contains("bad-name"), "reason: {reason}");
        }
        other => panic!("expected ConfigValidationFailed, got {other:?}"),
    }
}
