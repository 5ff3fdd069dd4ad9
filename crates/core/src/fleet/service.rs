//! Fleet sync orchestrator
//!
//! One pass: acquire or reuse the token, fetch vehicle summaries and
//! geofences concurrently, then enrich every summary with its details and an
//! optional VIN decode under a concurrency ceiling. The result is published
//! as one immutable [`FleetSnapshot`].
//!
//! Any failure ends the pass and resets the whole session: saved credentials
//! are discarded, the token is invalidated, the published snapshot is
//! emptied and the audit log is cleared. Recovery means logging in again.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use ravenfleet_common::resilience::ConcurrencyLimiter;
use ravenfleet_domain::constants::DEFAULT_MAX_CONCURRENT_DETAILS;
use ravenfleet_domain::{Credentials, FleetError, Result, VehicleRecord, VehicleSummary};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::ports::{FleetApi, VinDecoder};
use super::state::{FleetSnapshot, SyncPhase};
use super::vault::CredentialVault;
use crate::audit::AuditLog;
use crate::auth::{SessionToken, TokenManager, TokenState};
use crate::session::SessionHandle;

/// Builder for [`FleetSync`]
pub struct FleetSyncBuilder {
    api: Arc<dyn FleetApi>,
    tokens: Arc<TokenManager>,
    audit: Arc<AuditLog>,
    vault: CredentialVault,
    vin_decoder: Option<Arc<dyn VinDecoder>>,
    max_concurrent_details: usize,
    retain_logs_on_failure: bool,
}

impl FleetSyncBuilder {
    /// Decode VINs during enrichment. Without a decoder the lookup is skipped.
    pub fn with_vin_decoder(mut self, decoder: Arc<dyn VinDecoder>) -> Self {
        self.vin_decoder = Some(decoder);
        self
    }

    pub fn with_max_concurrent_details(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent_details = max_concurrent;
        self
    }

    /// Keep the audit log when a pass fails instead of clearing it with the
    /// rest of the session.
    pub fn with_retain_logs_on_failure(mut self, retain: bool) -> Self {
        self.retain_logs_on_failure = retain;
        self
    }

    /// # Errors
    /// Returns `FleetError::Config` for a zero concurrency limit.
    pub fn build(self) -> Result<FleetSync> {
        let limiter = ConcurrencyLimiter::new(self.max_concurrent_details)
            .map_err(|e| FleetError::config(format!("max_concurrent_details: {e}")))?;

        Ok(FleetSync {
            inner: Arc::new(FleetSyncInner {
                api: self.api,
                tokens: self.tokens,
                audit: self.audit,
                vault: self.vault,
                vin_decoder: self.vin_decoder,
                limiter,
                retain_logs_on_failure: self.retain_logs_on_failure,
                snapshot: RwLock::new(Arc::new(FleetSnapshot::default())),
                phase: RwLock::new(SyncPhase::Idle),
                last_error: RwLock::new(None),
                pass_lock: Mutex::new(()),
                reset_epoch: AtomicU64::new(0),
            }),
        })
    }
}

struct FleetSyncInner {
    api: Arc<dyn FleetApi>,
    tokens: Arc<TokenManager>,
    audit: Arc<AuditLog>,
    vault: CredentialVault,
    vin_decoder: Option<Arc<dyn VinDecoder>>,
    limiter: ConcurrencyLimiter,
    retain_logs_on_failure: bool,
    snapshot: RwLock<Arc<FleetSnapshot>>,
    phase: RwLock<SyncPhase>,
    last_error: RwLock<Option<FleetError>>,
    /// Passes run one at a time.
    pass_lock: Mutex<()>,
    /// Bumped under the snapshot write lock whenever the session is torn
    /// down. A pass only publishes if it is unchanged since the pass began.
    reset_epoch: AtomicU64,
}

/// Sequences token acquisition, list retrieval and per-vehicle enrichment.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct FleetSync {
    inner: Arc<FleetSyncInner>,
}

impl FleetSync {
    pub fn builder(
        api: Arc<dyn FleetApi>,
        tokens: Arc<TokenManager>,
        audit: Arc<AuditLog>,
        vault: CredentialVault,
    ) -> FleetSyncBuilder {
        FleetSyncBuilder {
            api,
            tokens,
            audit,
            vault,
            vin_decoder: None,
            max_concurrent_details: DEFAULT_MAX_CONCURRENT_DETAILS,
            retain_logs_on_failure: false,
        }
    }

    /// Last published state.
    pub fn snapshot(&self) -> Arc<FleetSnapshot> {
        Arc::clone(&self.inner.snapshot.read())
    }

    pub fn phase(&self) -> SyncPhase {
        *self.inner.phase.read()
    }

    /// Failure that ended the last pass, if it failed.
    pub fn last_error(&self) -> Option<FleetError> {
        self.inner.last_error.read().clone()
    }

    pub fn token_state(&self) -> TokenState {
        self.inner.tokens.state()
    }

    pub fn audit_log(&self) -> &Arc<AuditLog> {
        &self.inner.audit
    }

    pub fn max_concurrent_details(&self) -> usize {
        self.inner.limiter.max_concurrent()
    }

    /// Capability for consumers that issue their own calls with the current
    /// token. `None` while no token is held.
    pub fn session(&self) -> Option<SessionHandle> {
        self.inner.tokens.snapshot().map(|token| SessionHandle::new(token, self.clone()))
    }

    /// Save new credentials and run a fresh pass with them.
    ///
    /// # Errors
    /// Storage failures, or whatever ended the pass.
    pub async fn submit_credentials(&self, credentials: Credentials) -> Result<Arc<FleetSnapshot>> {
        self.inner.vault.save(&credentials)?;
        info!(api_url = %credentials.api_url(), "credentials submitted");
        self.sync(false).await
    }

    /// Run a fresh pass if credentials were saved earlier.
    ///
    /// # Errors
    /// Whatever ended the pass.
    pub async fn restore(&self) -> Result<Option<Arc<FleetSnapshot>>> {
        match self.inner.vault.load() {
            Ok(None) => Ok(None),
            // unreadable entries still go through the pass so they are discarded
            Ok(Some(_)) | Err(_) => self.sync(false).await.map(Some),
        }
    }

    /// Run one sync pass.
    ///
    /// A fresh pass (`is_refresh == false`) clears vehicles, geofences, logs
    /// and the token before starting and logs in from the saved credentials.
    /// A refresh pass reuses the current token and leaves the previous
    /// snapshot visible until the new one replaces it.
    ///
    /// # Errors
    /// The first failure of the pass, after the session has been reset.
    #[instrument(skip(self))]
    pub async fn sync(&self, is_refresh: bool) -> Result<Arc<FleetSnapshot>> {
        let _pass = self.inner.pass_lock.lock().await;
        let started = Instant::now();
        *self.inner.last_error.write() = None;

        if !is_refresh {
            self.clear_snapshot();
            self.inner.tokens.reset();
            self.inner.audit.clear();
        }
        let epoch = self.inner.reset_epoch.load(Ordering::Acquire);

        let outcome = match self.run_pass(is_refresh).await {
            Ok(next) => self.publish_pass(epoch, next),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(snapshot) => {
                self.set_phase(SyncPhase::Complete);
                info!(
                    vehicles = snapshot.vehicles().len(),
                    geofences = snapshot.geofences().len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "sync pass complete"
                );
                Ok(snapshot)
            }
            Err(err) => {
                error!(error = %err, kind = err.label(), "sync pass failed; resetting session");
                self.reset_session(&err);
                Err(err)
            }
        }
    }

    /// Re-login and return the new token.
    ///
    /// # Errors
    /// A failed refresh resets the session like a failed pass.
    pub async fn refresh_token(&self) -> Result<SessionToken> {
        let stale = self
            .inner
            .tokens
            .snapshot()
            .ok_or_else(|| FleetError::session_expired("no active session"))?;
        self.refresh_session(&stale).await
    }

    pub(crate) async fn refresh_session(&self, stale: &SessionToken) -> Result<SessionToken> {
        let epoch = self.inner.reset_epoch.load(Ordering::Acquire);
        match self.inner.tokens.refresh_from(stale).await {
            Ok(session) => Ok(session),
            Err(err) if self.inner.reset_epoch.load(Ordering::Acquire) != epoch => {
                debug!(error = %err, "session was replaced while refreshing");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed outside a pass; resetting session");
                self.reset_session(&err);
                Err(err)
            }
        }
    }

    /// Mark a vehicle as selected in the published snapshot.
    ///
    /// # Errors
    /// `FleetError::Validation` when no vehicle has that uuid.
    pub fn select(&self, uuid: &str) -> Result<Arc<FleetSnapshot>> {
        let mut current = self.inner.snapshot.write();
        let next = current
            .with_selection(Some(uuid))
            .ok_or_else(|| FleetError::validation(format!("no vehicle with uuid {uuid}")))?;
        *current = Arc::new(next);
        Ok(Arc::clone(&current))
    }

    pub fn clear_selection(&self) -> Arc<FleetSnapshot> {
        let mut current = self.inner.snapshot.write();
        if current.selected().is_some() {
            *current = Arc::new(current.with_selection(None).unwrap_or_default());
        }
        Arc::clone(&current)
    }

    /// End the session: forget credentials, token, state and logs.
    ///
    /// # Errors
    /// Storage failures while discarding saved credentials.
    pub async fn logout(&self) -> Result<()> {
        let _pass = self.inner.pass_lock.lock().await;
        self.clear_snapshot();
        self.inner.tokens.reset();
        self.inner.audit.clear();
        *self.inner.last_error.write() = None;
        self.set_phase(SyncPhase::Idle);
        info!("logged out");
        self.inner.vault.clear()
    }

    async fn run_pass(&self, is_refresh: bool) -> Result<FleetSnapshot> {
        self.set_phase(SyncPhase::TokenAcquiring);
        self.ensure_token(is_refresh).await?;

        self.set_phase(SyncPhase::ListFetching);
        let api = &self.inner.api;
        // both calls settle before either failure is reported
        let (summaries, geofences) = tokio::join!(
            self.authorized(|session| async move { api.list_vehicles(&session).await }),
            self.authorized(|session| async move { api.list_geofences(&session).await }),
        );
        let (summaries, geofences) = (summaries?, geofences?);
        ensure_unique_uuids(&summaries)?;

        if summaries.is_empty() {
            debug!(geofences = geofences.len(), "no vehicles; skipping enrichment");
            return Ok(FleetSnapshot::new(Vec::new(), geofences));
        }

        self.set_phase(SyncPhase::DetailEnriching);
        debug!(
            vehicles = summaries.len(),
            max_concurrent = self.inner.limiter.max_concurrent(),
            "enriching vehicles"
        );
        let vehicles = self.inner.limiter.run(summaries, |summary| self.enrich(summary)).await?;

        Ok(FleetSnapshot::new(vehicles, geofences))
    }

    async fn ensure_token(&self, is_refresh: bool) -> Result<SessionToken> {
        if is_refresh {
            if let Some(session) = self.inner.tokens.snapshot() {
                return Ok(session);
            }
            debug!("no token to reuse; logging in from saved credentials");
        }

        let credentials = self
            .inner
            .vault
            .load()?
            .ok_or_else(|| FleetError::auth(None, "no saved credentials, log in first"))?;
        self.inner.tokens.acquire(credentials).await
    }

    /// Run `call` with the current token; on 401/403 refresh once and retry.
    async fn authorized<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: Fn(SessionToken) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self
            .inner
            .tokens
            .snapshot()
            .ok_or_else(|| FleetError::session_expired("no active token"))?;

        match call(session.clone()).await {
            Err(err) if err.is_unauthorized() => {
                warn!(error = %err, version = session.version(), "token rejected; refreshing");
                let renewed = self.inner.tokens.refresh_from(&session).await?;
                call(renewed).await
            }
            outcome => outcome,
        }
    }

    async fn enrich(&self, summary: VehicleSummary) -> Result<VehicleRecord> {
        let api = &self.inner.api;
        let uuid = summary.uuid().to_string();
        let uuid = uuid.as_str();

        let details = self
            .authorized(|session| async move { api.vehicle_details(&session, uuid).await })
            .await?;
        let record = VehicleRecord::merge(summary, details)?;

        let (Some(decoder), Some(vin)) = (&self.inner.vin_decoder, record.vin()) else {
            return Ok(record);
        };
        let info = decoder.decode(vin).await?;
        Ok(record.with_vehicle_info(info))
    }

    fn reset_session(&self, cause: &FleetError) {
        if let Err(err) = self.inner.vault.clear() {
            warn!(error = %err, "failed to discard saved credentials");
        }
        self.clear_snapshot();
        self.inner.tokens.invalidate();
        if !self.inner.retain_logs_on_failure {
            self.inner.audit.clear();
        }
        *self.inner.last_error.write() = Some(cause.clone());
        self.set_phase(SyncPhase::Errored);
    }

    /// Publish a finished pass unless the session was reset while it ran.
    fn publish_pass(&self, epoch: u64, next: FleetSnapshot) -> Result<Arc<FleetSnapshot>> {
        let mut current = self.inner.snapshot.write();
        if self.inner.reset_epoch.load(Ordering::Acquire) != epoch {
            return Err(FleetError::session_expired("session was reset during the sync pass"));
        }
        let snapshot = Arc::new(next.keep_selection_from(&current));
        *current = Arc::clone(&snapshot);
        Ok(snapshot)
    }

    /// Empty the published snapshot and start a new reset epoch.
    fn clear_snapshot(&self) {
        let mut current = self.inner.snapshot.write();
        self.inner.reset_epoch.fetch_add(1, Ordering::AcqRel);
        *current = Arc::new(FleetSnapshot::default());
    }

    fn set_phase(&self, phase: SyncPhase) {
        debug!(%phase, "sync phase");
        *self.inner.phase.write() = phase;
    }
}

impl fmt::Debug for FleetSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetSync")
            .field("phase", &self.phase())
            .field("token_state", &self.token_state())
            .field("max_concurrent_details", &self.max_concurrent_details())
            .finish_non_exhaustive()
    }
}

fn ensure_unique_uuids(summaries: &[VehicleSummary]) -> Result<()> {
    let mut seen = HashSet::with_capacity(summaries.len());
    for summary in summaries {
        if !seen.insert(summary.uuid()) {
            return Err(FleetError::validation(format!(
                "vehicle list contains uuid {} more than once",
                summary.uuid()
            )));
        }
    }
    Ok(())
}
