//! Loading configuration from files and the environment

use std::io::Write;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::NamedTempFile;
use villagesync::shared::{AppConfig, ConfigError, StoreKind};
use villagesync::sync::StatusPolicy;

use crate::assert_ok;

const ENV_VARS: &[&str] = &[
    "VILLAGESYNC_API_URL",
    "VILLAGESYNC_STORE",
    "VILLAGESYNC_STORE_PATH",
    "VILLAGESYNC_STATUS_POLICY",
    "VILLAGESYNC_TIMEOUT_SECS",
];

fn clear_env() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = assert_ok!(NamedTempFile::new());
    assert_ok!(file.write_all(contents.as_bytes()));
    file
}

#[test]
#[serial]
fn test_load_defaults_without_file() {
    clear_env();
    let config = assert_ok!(AppConfig::load(None));
    assert_eq!(config, AppConfig::default());
}

#[test]
#[serial]
fn test_load_from_toml_file() {
    clear_env();
    let file = config_file(
        r#"
api_url = "https://village.example.org"
status_policy = "require-success"
request_timeout_secs = 20

[store]
kind = "sqlite"
path = "/tmp/villagesync-test.db"

[probe]
path = "/api/health"
"#,
    );

    let config = assert_ok!(AppConfig::load(Some(file.path())));

    assert_eq!(config.api_url, "https://village.example.org");
    assert_eq!(config.status_policy, StatusPolicy::RequireSuccess);
    assert_eq!(config.store.kind, StoreKind::Sqlite);
    assert_eq!(config.store.slot, "offlineQueue");
    assert_eq!(config.probe.path, "/api/health");
    assert_eq!(config.probe.interval_secs, AppConfig::default().probe.interval_secs);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file("api_url = \"http://from-file:3000\"\n");
    std::env::set_var("VILLAGESYNC_API_URL", "http://from-env:4000");
    std::env::set_var("VILLAGESYNC_STORE", "memory");
    std::env::set_var("VILLAGESYNC_TIMEOUT_SECS", "3");

    let config = AppConfig::load(Some(file.path()));
    clear_env();
    let config = assert_ok!(config);

    assert_eq!(config.api_url, "http://from-env:4000");
    assert_eq!(config.store.kind, StoreKind::Memory);
    assert_eq!(config.request_timeout_secs, Some(3));
}

#[test]
#[serial]
fn test_invalid_env_value_is_rejected() {
    clear_env();
    std::env::set_var("VILLAGESYNC_STATUS_POLICY", "sometimes");

    let result = AppConfig::load(None);
    clear_env();

    assert_matches!(result, Err(ConfigError::InvalidValue { .. }));
}

#[test]
#[serial]
fn test_unparseable_file_is_rejected() {
    clear_env();
    let file = config_file("api_url = [not toml");

    assert_matches!(AppConfig::load(Some(file.path())), Err(ConfigError::Parse(_)));
}

#[test]
#[serial]
fn test_non_http_url_is_rejected() {
    clear_env();
    let file = config_file("api_url = \"ftp://village.example.org\"\n");

    assert_matches!(AppConfig::load(Some(file.path())), Err(ConfigError::InvalidUrl(_)));
}
