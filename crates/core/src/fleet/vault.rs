//! Persisted credentials

use std::sync::Arc;

use ravenfleet_domain::constants::DEFAULT_CREDENTIALS_KEY;
use ravenfleet_domain::{Credentials, FleetError, Result};
use tracing::{debug, warn};

use super::ports::KeyValueStore;

/// Saves the user's credentials under one fixed key of a [`KeyValueStore`].
#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_CREDENTIALS_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// # Errors
    /// Returns `FleetError::Validation` when the stored entry cannot be read
    /// back as valid credentials, or the store's own error.
    pub fn load(&self) -> Result<Option<Credentials>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let credentials: Credentials = serde_json::from_str(&raw).map_err(|e| {
            warn!(key = %self.key, error = %e, "stored credentials are unreadable");
            FleetError::validation(format!("stored credentials are unreadable: {e}"))
        })?;
        credentials.validate()?;
        Ok(Some(credentials))
    }

    /// # Errors
    /// Propagates store failures.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let raw = serde_json::to_string(credentials)
            .map_err(|e| FleetError::internal(format!("failed to encode credentials: {e}")))?;
        self.store.set(&self.key, &raw)?;
        debug!(key = %self.key, "credentials saved");
        Ok(())
    }

    /// # Errors
    /// Propagates store failures.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)?;
        debug!(key = %self.key, "credentials discarded");
        Ok(())
    }
}
