//! Configuration structures
//!
//! Every section has defaults so a missing file or a partial file still
//! yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_CREDENTIALS_KEY, DEFAULT_CREDENTIALS_PATH,
    DEFAULT_MAX_CONCURRENT_DETAILS, DEFAULT_USER_AGENT, DEFAULT_VIN_BASE_URL,
    DEFAULT_VIN_TIMEOUT_SECS,
};
use crate::errors::{FleetError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub vin: VinConfig,
    pub audit: AuditConfig,
}

impl Config {
    /// # Errors
    /// Returns `FleetError::Config` for values that would make the client
    /// unusable.
    pub fn validate(&self) -> Result<()> {
        if self.sync.max_concurrent_details == 0 {
            return Err(FleetError::config("sync.max_concurrent_details must be at least 1"));
        }
        if self.api.timeout_secs == 0 {
            return Err(FleetError::config("api.timeout_secs must be greater than 0"));
        }
        if self.vin.enabled && self.vin.timeout_secs == 0 {
            return Err(FleetError::config("vin.timeout_secs must be greater than 0"));
        }
        if self.audit.max_entries == Some(0) {
            return Err(FleetError::config("audit.max_entries must be at least 1 when set"));
        }
        if !self.api.endpoints.vehicle_details_path.contains("{uuid}") {
            return Err(FleetError::config(
                "api.endpoints.vehicle_details_path must contain a {uuid} placeholder",
            ));
        }
        Ok(())
    }
}

/// Remote API settings. The base URL comes from the user's credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub endpoints: ApiEndpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: ApiEndpoints::default(),
        }
    }
}

/// Paths appended to the credential's API URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub auth_path: String,
    pub vehicles_path: String,
    pub geofences_path: String,
    /// Must contain `{uuid}`.
    pub vehicle_details_path: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            auth_path: "/auth/token".to_string(),
            vehicles_path: "/ravens".to_string(),
            geofences_path: "/geofences".to_string(),
            vehicle_details_path: "/ravens/{uuid}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on detail/VIN lookups in flight at once.
    pub max_concurrent_details: usize,
    /// Keep the audit log after a failed pass instead of clearing it with the
    /// rest of the session.
    pub retain_logs_on_failure: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { max_concurrent_details: DEFAULT_MAX_CONCURRENT_DETAILS, retain_logs_on_failure: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub credentials_path: String,
    pub credentials_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            credentials_path: DEFAULT_CREDENTIALS_PATH.to_string(),
            credentials_key: DEFAULT_CREDENTIALS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VinConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for VinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_VIN_BASE_URL.to_string(),
            timeout_secs: DEFAULT_VIN_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Oldest entries are dropped once the log holds this many.
    pub max_entries: Option<usize>,
}
