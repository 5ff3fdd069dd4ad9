//! Published fleet state and sync pass phases

use ravenfleet_domain::{impl_state_conversions, Geofence, VehicleRecord};
use serde::Serialize;

/// Progress of the current (or last) sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    TokenAcquiring,
    ListFetching,
    DetailEnriching,
    Complete,
    Errored,
}

impl_state_conversions!(SyncPhase {
    Idle => "idle",
    TokenAcquiring => "token_acquiring",
    ListFetching => "list_fetching",
    DetailEnriching => "detail_enriching",
    Complete => "complete",
    Errored => "errored",
});

/// Everything a completed pass produced, replaced wholesale by the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSnapshot {
    vehicles: Vec<VehicleRecord>,
    geofences: Vec<Geofence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected: Option<String>,
}

impl FleetSnapshot {
    pub fn new(vehicles: Vec<VehicleRecord>, geofences: Vec<Geofence>) -> Self {
        Self { vehicles, geofences, selected: None }
    }

    pub fn vehicles(&self) -> &[VehicleRecord] {
        &self.vehicles
    }

    pub fn geofences(&self) -> &[Geofence] {
        &self.geofences
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_vehicle(&self) -> Option<&VehicleRecord> {
        let uuid = self.selected.as_deref()?;
        self.vehicle(uuid)
    }

    pub fn vehicle(&self, uuid: &str) -> Option<&VehicleRecord> {
        self.vehicles.iter().find(|vehicle| vehicle.uuid() == uuid)
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty() && self.geofences.is_empty()
    }

    /// Copy with `uuid` selected, or `None` if no such vehicle exists.
    pub(crate) fn with_selection(&self, uuid: Option<&str>) -> Option<Self> {
        if let Some(uuid) = uuid {
            self.vehicle(uuid)?;
        }
        Some(Self { selected: uuid.map(str::to_string), ..self.clone() })
    }

    /// Carry `selected` over from the previous snapshot if the vehicle
    /// survived the pass.
    pub(crate) fn keep_selection_from(mut self, previous: &Self) -> Self {
        self.selected = previous.selected.clone().filter(|uuid| self.vehicle(uuid).is_some());
        self
    }
}
