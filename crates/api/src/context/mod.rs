//! Application context - dependency injection container

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ravenfleet_core::{AuditLog, CredentialVault, FleetSync, KeyValueStore, TokenManager};
use ravenfleet_domain::{Config, Result};
use ravenfleet_infra::{
    config, HttpClient, HttpExchange, JsonFileStore, NhtsaVinDecoder, RavenApiClient,
};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub audit: Arc<AuditLog>,
    pub sync: FleetSync,
}

impl AppContext {
    /// Load configuration (explicit path, probed file or defaults) and wire
    /// the services.
    ///
    /// # Errors
    /// Returns `FleetError::Config` if the configuration is invalid.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = config::load(config_path)?;
        Self::new(config)
    }

    /// Wire the services with a file-backed credential store at
    /// `config.storage.credentials_path`.
    ///
    /// # Errors
    /// Returns `FleetError::Config` if the configuration is invalid, or an
    /// HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(&config.storage.credentials_path));
        Self::with_store(config, store)
    }

    /// Wire the services around an arbitrary credential store.
    ///
    /// # Errors
    /// Same as [`AppContext::new`].
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        config.validate()?;

        let audit = Arc::new(AuditLog::with_max_entries(config.audit.max_entries));

        let api_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .user_agent(config.api.user_agent.clone())
            .build()?;
        let api_exchange = Arc::new(HttpExchange::new(api_client, Arc::clone(&audit)));
        let raven =
            Arc::new(RavenApiClient::with_endpoints(api_exchange, config.api.endpoints.clone()));

        let vault = CredentialVault::with_key(store, config.storage.credentials_key.clone());
        let tokens = Arc::new(TokenManager::new(raven.clone()));

        let mut builder = FleetSync::builder(raven, tokens, Arc::clone(&audit), vault)
            .with_max_concurrent_details(config.sync.max_concurrent_details)
            .with_retain_logs_on_failure(config.sync.retain_logs_on_failure);

        if config.vin.enabled {
            let vin_client = HttpClient::builder()
                .timeout(Duration::from_secs(config.vin.timeout_secs))
                .user_agent(config.api.user_agent.clone())
                .build()?;
            let vin_exchange = Arc::new(HttpExchange::new(vin_client, Arc::clone(&audit)));
            builder = builder.with_vin_decoder(Arc::new(NhtsaVinDecoder::with_base_url(
                vin_exchange,
                config.vin.base_url.clone(),
            )));
        }

        let sync = builder.build()?;

        info!(
            max_concurrent_details = config.sync.max_concurrent_details,
            vin_enabled = config.vin.enabled,
            "application context ready"
        );

        Ok(Self { config, audit, sync })
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("phase", &self.sync.phase())
            .field("log_entries", &self.audit.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ravenfleet_domain::FleetError;
    use ravenfleet_infra::MemoryStore;

    use super::*;

    #[test]
    fn wires_configured_limits() {
        let mut config = Config::default();
        config.sync.max_concurrent_details = 2;
        config.vin.enabled = false;

        let ctx = AppContext::with_store(config, Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(ctx.sync.max_concurrent_details(), 2);
        assert!(ctx.audit.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;

        let err = AppContext::with_store(config, Arc::new(MemoryStore::new())).unwrap_err();
        assert!(matches!(err, FleetError::Config { .. }));
    }
}
