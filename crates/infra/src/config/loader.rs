//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every section of the file format is optional; omitted fields keep their
//! defaults. The result is validated before it is returned.
//!
//! ## Environment Variables
//! - `TOLLGATE_DATABASE_URL`: Postgres connection URL (required)
//! - `TOLLGATE_SOCIAL_BEARER_TOKEN`: Social API bearer token (required)
//! - `TOLLGATE_SOCIAL_BASE_URL`: Social API base URL
//! - `TOLLGATE_DB_MAX_RETRIES`: Attempts per database operation
//! - `TOLLGATE_DB_CONNECTION_TIMEOUT`: Probe/connect timeout in seconds
//! - `TOLLGATE_DB_REQUIRE_TLS`: Whether to connect over TLS (true/false)
//! - `TOLLGATE_LOG_LEVEL`: Default log level when `RUST_LOG` is unset
//! - `TOLLGATE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following names, in order, in the current working
//! directory, its parent and grandparent, then next to the executable:
//! `tollgate.toml`, `tollgate.json`, `config.toml`, `config.json`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tollgate_domain::{Config, Result, TollgateError};

const CONFIG_FILE_NAMES: [&str; 4] = ["tollgate.toml", "tollgate.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TollgateError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `TOLLGATE_DATABASE_URL` and `TOLLGATE_SOCIAL_BEARER_TOKEN` must be set;
/// everything else falls back to the defaults.
///
/// # Errors
/// Returns `TollgateError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.url = env_var("TOLLGATE_DATABASE_URL")?;
    config.social.bearer_token = Some(env_var("TOLLGATE_SOCIAL_BEARER_TOKEN")?);

    if let Ok(base_url) = std::env::var("TOLLGATE_SOCIAL_BASE_URL") {
        config.social.base_url = base_url;
    }
    if let Some(max_retries) = env_parse::<u32>("TOLLGATE_DB_MAX_RETRIES")? {
        config.retry.max_retries = max_retries;
    }
    if let Some(timeout) = env_parse::<u64>("TOLLGATE_DB_CONNECTION_TIMEOUT")? {
        config.database.connection_timeout_secs = timeout;
    }
    config.database.require_tls = env_bool("TOLLGATE_DB_REQUIRE_TLS", config.database.require_tls);
    if let Ok(level) = std::env::var("TOLLGATE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("TOLLGATE_LOG_JSON", config.logging.json);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations (see module docs).
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TollgateError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TollgateError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TollgateError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TollgateError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TollgateError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TollgateError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(TollgateError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Candidate files in `dir` and up to two ancestors, nearest first
fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .take(3)
        .flat_map(|ancestor| CONFIG_FILE_NAMES.iter().map(move |name| ancestor.join(name)))
        .collect()
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| TollgateError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional environment variable; present but unparsable is an error
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| TollgateError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
