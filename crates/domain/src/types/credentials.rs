//! API credentials submitted by the user

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{FleetError, Result};

/// Credentials for the fleet telemetry API.
///
/// Immutable once validated. The persisted form uses camelCase keys so a
/// browser front-end and this backend can share the same storage entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    api_url: String,
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Validate and build credentials.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` if a field is blank or the URL is not
    /// an absolute http(s) URL.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            api_url: api_url.into().trim().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
            api_secret: api_secret.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Re-check invariants, used after deserializing a persisted entry.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(FleetError::validation("API URL is required"));
        }
        if self.api_key.is_empty() {
            return Err(FleetError::validation("API key is required"));
        }
        if self.api_secret.trim().is_empty() {
            return Err(FleetError::validation("API secret is required"));
        }

        let parsed = Url::parse(&self.api_url)
            .map_err(|e| FleetError::validation(format!("API URL is not valid: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FleetError::validation(format!(
                "API URL must use http or https, got {}",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
