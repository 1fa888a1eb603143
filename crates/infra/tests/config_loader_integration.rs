//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tollgate_domain::TollgateError;
use tollgate_infra::config;

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "gateway": {
            "queue_capacity": 32,
            "wait_ceiling_secs": 120,
            "lookup_account": { "requests_per_window": 3, "window_secs": 60 }
        },
        "social": {
            "base_url": "https://social.internal",
            "bearer_token": "json-token"
        },
        "database": {
            "url": "postgres://game@db.internal/tollgate",
            "connection_timeout_secs": 4,
            "require_tls": true
        },
        "retry": { "max_retries": 6, "base_delay_ms": 250, "max_delay_ms": 8000 },
        "logging": { "level": "debug", "json": true }
    }"#;
    let path = write_config(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from JSON file: {:?}", result.err());

    let config = result.unwrap();

    assert_eq!(config.gateway.queue_capacity, 32);
    assert_eq!(config.gateway.wait_ceiling_secs, 120);
    assert_eq!(config.gateway.lookup_account.requests_per_window, 3);
    assert_eq!(config.gateway.lookup_account.window_secs, 60);
    // endpoints not mentioned keep the one-per-fifteen-minutes default
    assert_eq!(config.gateway.fetch_posts.requests_per_window, 1);
    assert_eq!(config.gateway.fetch_posts.window_secs, 900);

    assert_eq!(config.social.base_url, "https://social.internal");
    assert_eq!(config.social.bearer_token.as_deref(), Some("json-token"));
    assert_eq!(config.database.url, "postgres://game@db.internal/tollgate");
    assert_eq!(config.database.connection_timeout_secs, 4);
    assert!(config.database.require_tls);
    assert_eq!(config.retry.max_retries, 6);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[gateway]
cache_ttl_secs = 60
cache_max_entries = 50

[gateway.health_probe]
requests_per_window = 10
window_secs = 900

[database]
url = "host=localhost user=tollgate dbname=tollgate"
reconnect_attempts = 5
"#;
    let path = write_config(toml_content, "toml");

    let config = config::load_from_file(Some(path.clone())).expect("toml config");

    assert_eq!(config.gateway.cache_ttl_secs, 60);
    assert_eq!(config.gateway.cache_max_entries, 50);
    assert_eq!(config.gateway.health_probe.requests_per_window, 10);
    assert_eq!(config.database.url, "host=localhost user=tollgate dbname=tollgate");
    assert_eq!(config.database.reconnect_attempts, 5);
    assert_eq!(config.social.bearer_token, None);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_no_fields() {
    let path = write_config("{}", "json");

    let config = config::load_from_file(Some(path.clone())).expect("empty config");
    assert_eq!(config, tollgate_domain::Config::default());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/tollgate.json".into()));
    assert!(result.is_err(), "Should fail when file doesn't exist");

    match result {
        Err(TollgateError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_err(), "Should fail with invalid JSON");

    match result {
        Err(TollgateError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        _ => panic!("Expected Config error"),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_rejects_zero_quota() {
    let toml_content = r#"
[gateway.fetch_posts]
requests_per_window = 0
window_secs = 900
"#;
    let path = write_config(toml_content, "toml");

    match config::load_from_file(Some(path.clone())) {
        Err(TollgateError::Config(msg)) => assert!(msg.contains("fetch_posts")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    std::fs::remove_file(path).ok();
}
