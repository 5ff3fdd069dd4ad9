//! Configuration loading
//!
//! Reads the application configuration from TOML or JSON files and applies
//! environment overrides.

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_file, parse_config, probe_config_paths};
