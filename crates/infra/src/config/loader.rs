//! Configuration loader
//!
//! Loads application configuration from a file and applies environment
//! overrides on top.
//!
//! ## Loading Strategy
//! 1. Use the explicit path if one is given, otherwise probe standard paths
//! 2. Fall back to built-in defaults when no file exists
//! 3. Apply `RAVENFLEET_*` environment overrides
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `RAVENFLEET_API_TIMEOUT_SECS`: Request timeout for the fleet API
//! - `RAVENFLEET_MAX_CONCURRENT_DETAILS`: Detail lookups in flight at once
//! - `RAVENFLEET_RETAIN_LOGS_ON_FAILURE`: Keep the audit log after a failed
//!   pass (true/false)
//! - `RAVENFLEET_CREDENTIALS_PATH`: Credential store file
//! - `RAVENFLEET_VIN_ENABLED`: Whether VIN decoding runs (true/false)
//! - `RAVENFLEET_VIN_BASE_URL`: VIN decoding service base URL
//! - `RAVENFLEET_AUDIT_MAX_ENTRIES`: Cap on retained audit entries
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./ravenfleet.toml` or `./ravenfleet.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ravenfleet_domain::{Config, FleetError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["ravenfleet.toml", "ravenfleet.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Arguments
/// * `path` - Explicit config file. If `None`, uses [`probe_config_paths`]
///   and falls back to defaults when nothing is found.
///
/// # Errors
/// Returns `FleetError::Config` if:
/// - An explicit file does not exist
/// - File format is invalid
/// - An environment override has an invalid value
/// - The merged configuration fails validation
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(&path)?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// Supports both JSON and TOML formats (detected by file extension). Missing
/// keys take their default values.
///
/// # Errors
/// Returns `FleetError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(FleetError::config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| FleetError::config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `FleetError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FleetError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FleetError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(FleetError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard paths for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Apply `RAVENFLEET_*` environment overrides.
///
/// # Errors
/// Returns `FleetError::Config` if a numeric variable does not parse.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(secs) = env_parse::<u64>("RAVENFLEET_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = secs;
    }
    if let Some(limit) = env_parse::<usize>("RAVENFLEET_MAX_CONCURRENT_DETAILS")? {
        config.sync.max_concurrent_details = limit;
    }
    config.sync.retain_logs_on_failure =
        env_bool("RAVENFLEET_RETAIN_LOGS_ON_FAILURE", config.sync.retain_logs_on_failure);
    if let Some(path) = env_string("RAVENFLEET_CREDENTIALS_PATH") {
        config.storage.credentials_path = path;
    }
    config.vin.enabled = env_bool("RAVENFLEET_VIN_ENABLED", config.vin.enabled);
    if let Some(url) = env_string("RAVENFLEET_VIN_BASE_URL") {
        config.vin.base_url = url;
    }
    if let Some(max) = env_parse::<usize>("RAVENFLEET_AUDIT_MAX_ENTRIES")? {
        config.audit.max_entries = Some(max);
    }
    Ok(())
}

/// Non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| FleetError::config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
