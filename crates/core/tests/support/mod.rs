//! Shared test helpers for `ravenfleet-core` integration tests.
//!
//! Scripted in-memory stand-ins for the fleet API, the login exchange, the
//! VIN lookup and credential storage. Each fake appends one audit record per
//! call, the way the HTTP adapters do.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use ravenfleet_common::testing::ConcurrencyProbe;
use ravenfleet_core::{
    AuditLog, AuthGateway, CredentialVault, FleetApi, FleetSync, KeyValueStore, SessionToken,
    TokenManager, VinDecoder,
};
use ravenfleet_domain::{
    AuditRecord, AuditRequest, AuditResponse, Credentials, FleetError, Geofence, Result,
    VehicleDetails, VehicleInfo, VehicleSummary,
};
use serde_json::{json, Value};

pub const API_URL: &str = "https://fleet.test";

pub fn credentials() -> Credentials {
    Credentials::new(API_URL, "key-1", "secret-1").unwrap()
}

fn audit(log: &AuditLog, method: &str, endpoint: &str, status: u16) {
    log.append(AuditRecord {
        endpoint: endpoint.to_string(),
        request: AuditRequest { method: method.to_string(), body: None },
        response: AuditResponse {
            status,
            status_text: String::new(),
            ok: (200..300).contains(&status),
            body: None,
        },
        duration_ms: 0,
    });
}

fn http_error(status: u16) -> FleetError {
    FleetError::Http { status, status_text: String::new(), body: String::new() }
}

/// Login exchange that hands out tokens from a script.
pub struct FakeGateway {
    audit: Arc<AuditLog>,
    script: Mutex<VecDeque<std::result::Result<String, u16>>>,
    logins: AtomicUsize,
    delay: Duration,
}

impl FakeGateway {
    pub fn new(audit: Arc<AuditLog>, script: &[std::result::Result<&str, u16>]) -> Arc<Self> {
        Arc::new(Self {
            audit,
            script: Mutex::new(script.iter().map(|o| o.map(str::to_string)).collect()),
            logins: AtomicUsize::new(0),
            delay: Duration::from_millis(5),
        })
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn push(&self, outcome: std::result::Result<&str, u16>) {
        self.script.lock().push_back(outcome.map(str::to_string));
    }
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn login(&self, _credentials: &Credentials) -> Result<String> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let endpoint = format!("{API_URL}/auth/token");
        match self.script.lock().pop_front() {
            Some(Ok(token)) => {
                audit(&self.audit, "POST", &endpoint, 200);
                Ok(token)
            }
            Some(Err(status)) => {
                audit(&self.audit, "POST", &endpoint, status);
                Err(FleetError::auth(Some(status), "invalid credentials"))
            }
            None => {
                audit(&self.audit, "POST", &endpoint, 401);
                Err(FleetError::auth(Some(401), "no more tokens"))
            }
        }
    }
}

/// Fleet API backed by JSON fixtures.
pub struct FakeFleetApi {
    audit: Arc<AuditLog>,
    vehicles: Mutex<Vec<Value>>,
    geofences: Mutex<Vec<Value>>,
    vehicle_list_failure: Mutex<Option<u16>>,
    geofence_delay: Mutex<Duration>,
    details: Mutex<HashMap<String, Value>>,
    detail_failures: Mutex<HashMap<String, u16>>,
    /// When set, detail calls with any other token get a 401.
    details_token: Mutex<Option<String>>,
    detail_delay: Mutex<Duration>,
    detail_calls: AtomicUsize,
    pub probe: ConcurrencyProbe,
}

impl FakeFleetApi {
    pub fn new(audit: Arc<AuditLog>) -> Arc<Self> {
        Arc::new(Self {
            audit,
            vehicles: Mutex::new(Vec::new()),
            geofences: Mutex::new(Vec::new()),
            vehicle_list_failure: Mutex::new(None),
            geofence_delay: Mutex::new(Duration::ZERO),
            details: Mutex::new(HashMap::new()),
            detail_failures: Mutex::new(HashMap::new()),
            details_token: Mutex::new(None),
            detail_delay: Mutex::new(Duration::from_millis(5)),
            detail_calls: AtomicUsize::new(0),
            probe: ConcurrencyProbe::new(),
        })
    }

    pub fn set_vehicles(&self, vehicles: Vec<Value>) {
        *self.vehicles.lock() = vehicles;
    }

    pub fn set_geofences(&self, geofences: Vec<Value>) {
        *self.geofences.lock() = geofences;
    }

    pub fn fail_vehicle_list(&self, status: u16) {
        *self.vehicle_list_failure.lock() = Some(status);
    }

    pub fn set_geofence_delay(&self, delay: Duration) {
        *self.geofence_delay.lock() = delay;
    }

    pub fn set_details(&self, uuid: &str, details: Value) {
        self.details.lock().insert(uuid.to_string(), details);
    }

    pub fn fail_details(&self, uuid: &str, status: u16) {
        self.detail_failures.lock().insert(uuid.to_string(), status);
    }

    pub fn require_details_token(&self, token: &str) {
        *self.details_token.lock() = Some(token.to_string());
    }

    pub fn set_detail_delay(&self, delay: Duration) {
        *self.detail_delay.lock() = delay;
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FleetApi for FakeFleetApi {
    async fn list_vehicles(&self, session: &SessionToken) -> Result<Vec<VehicleSummary>> {
        let endpoint = format!("{}/ravens", session.api_url());
        if let Some(status) = *self.vehicle_list_failure.lock() {
            audit(&self.audit, "GET", &endpoint, status);
            return Err(http_error(status));
        }
        audit(&self.audit, "GET", &endpoint, 200);
        let raw = Value::Array(self.vehicles.lock().clone());
        serde_json::from_value(raw).map_err(|e| FleetError::validation(e.to_string()))
    }

    async fn list_geofences(&self, session: &SessionToken) -> Result<Vec<Geofence>> {
        let delay = *self.geofence_delay.lock();
        tokio::time::sleep(delay).await;
        let endpoint = format!("{}/geofences", session.api_url());
        audit(&self.audit, "GET", &endpoint, 200);
        let raw = Value::Array(self.geofences.lock().clone());
        serde_json::from_value(raw).map_err(|e| FleetError::validation(e.to_string()))
    }

    async fn vehicle_details(&self, session: &SessionToken, uuid: &str) -> Result<VehicleDetails> {
        let _guard = self.probe.enter();
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.detail_delay.lock();
        tokio::time::sleep(delay).await;

        let endpoint = format!("{}/ravens/{uuid}", session.api_url());
        let required = self.details_token.lock().clone();
        if required.is_some_and(|token| token != session.token()) {
            audit(&self.audit, "GET", &endpoint, 401);
            return Err(http_error(401));
        }
        if let Some(status) = self.detail_failures.lock().get(uuid).copied() {
            audit(&self.audit, "GET", &endpoint, status);
            return Err(http_error(status));
        }

        audit(&self.audit, "GET", &endpoint, 200);
        let details = self.details.lock().get(uuid).cloned().unwrap_or_else(|| json!({}));
        VehicleDetails::try_from(details)
    }
}

/// VIN lookup answering from a fixture map; unknown VINs fail.
pub struct FakeVinDecoder {
    audit: Arc<AuditLog>,
    known: Mutex<HashMap<String, Value>>,
    calls: AtomicUsize,
}

impl FakeVinDecoder {
    pub fn new(audit: Arc<AuditLog>) -> Arc<Self> {
        Arc::new(Self { audit, known: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0) })
    }

    pub fn insert(&self, vin: &str, info: Value) {
        self.known.lock().insert(vin.to_string(), info);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VinDecoder for FakeVinDecoder {
    async fn decode(&self, vin: &str) -> Result<VehicleInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let endpoint = format!("https://vin.test/vehicles/DecodeVinValues/{vin}?format=json");
        match self.known.lock().get(vin).cloned() {
            Some(Value::Object(info)) => {
                audit(&self.audit, "GET", &endpoint, 200);
                Ok(VehicleInfo::new(info))
            }
            _ => {
                audit(&self.audit, "GET", &endpoint, 500);
                Err(http_error(500))
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryKv(Mutex<HashMap<String, String>>);

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.0.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.0.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.0.lock().remove(key);
        Ok(())
    }
}

/// Fully wired `FleetSync` over the fakes.
pub struct Harness {
    pub sync: FleetSync,
    pub audit: Arc<AuditLog>,
    pub api: Arc<FakeFleetApi>,
    pub gateway: Arc<FakeGateway>,
    pub vin: Arc<FakeVinDecoder>,
    pub vault: CredentialVault,
    pub store: Arc<MemoryKv>,
}

impl Harness {
    pub fn new(tokens: &[std::result::Result<&str, u16>]) -> Self {
        Self::with_limit(tokens, 5)
    }

    pub fn with_limit(tokens: &[std::result::Result<&str, u16>], limit: usize) -> Self {
        Self::build(tokens, limit, false)
    }

    /// Harness whose audit log survives a failed pass.
    pub fn retaining_logs(tokens: &[std::result::Result<&str, u16>]) -> Self {
        Self::build(tokens, 5, true)
    }

    fn build(tokens: &[std::result::Result<&str, u16>], limit: usize, retain_logs: bool) -> Self {
        let audit = Arc::new(AuditLog::new());
        let api = FakeFleetApi::new(Arc::clone(&audit));
        let gateway = FakeGateway::new(Arc::clone(&audit), tokens);
        let vin = FakeVinDecoder::new(Arc::clone(&audit));
        let store = Arc::new(MemoryKv::default());
        let vault = CredentialVault::new(store.clone());

        let sync = FleetSync::builder(
            api.clone(),
            Arc::new(TokenManager::new(gateway.clone())),
            Arc::clone(&audit),
            vault.clone(),
        )
        .with_vin_decoder(vin.clone())
        .with_max_concurrent_details(limit)
        .with_retain_logs_on_failure(retain_logs)
        .build()
        .unwrap();

        Self { sync, audit, api, gateway, vin, vault, store }
    }

    /// Fixture with vehicles a, b, c where only b reports a VIN.
    pub fn abc(&self) {
        self.api.set_vehicles(vec![json!({"uuid": "a"}), json!({"uuid": "b"}), json!({"uuid": "c"})]);
        self.api.set_geofences(vec![json!({"uuid": "g1", "name": "Depot"})]);
        self.api.set_details("a", json!({"uuid": "a", "name": "Alpha"}));
        self.api.set_details("b", json!({"uuid": "b", "name": "Bravo", "vehicle_vin": "1FTFW1ET5DFC10312"}));
        self.api.set_details("c", json!({"uuid": "c", "name": "Charlie"}));
        self.vin.insert("1FTFW1ET5DFC10312", json!({"Make": "FORD", "Model": "F-150"}));
    }
}
