//! Port interfaces for fleet data

use async_trait::async_trait;
use ravenfleet_domain::{Geofence, Result, VehicleDetails, VehicleInfo, VehicleSummary};

use crate::auth::SessionToken;

/// Authenticated reads against the fleet API.
///
/// Implementations report a rejected bearer token as `FleetError::Http`
/// with status 401 or 403 so the caller can refresh and retry.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// List vehicle summaries
    async fn list_vehicles(&self, session: &SessionToken) -> Result<Vec<VehicleSummary>>;

    /// List geofences
    async fn list_geofences(&self, session: &SessionToken) -> Result<Vec<Geofence>>;

    /// Fetch details for one vehicle
    async fn vehicle_details(&self, session: &SessionToken, uuid: &str) -> Result<VehicleDetails>;
}

/// External VIN lookup. Needs no bearer token.
#[async_trait]
pub trait VinDecoder: Send + Sync {
    async fn decode(&self, vin: &str) -> Result<VehicleInfo>;
}

/// String storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
