//! Fleet data commands

use ravenfleet_core::{FleetSnapshot, SyncPhase};
use ravenfleet_domain::{FleetError, Geofence, Result as DomainResult, VehicleRecord};
use serde::Serialize;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Dashboard status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetStatus {
    pub phase: SyncPhase,
    pub token_state: String,
    /// User-facing message for the last failed pass.
    pub last_error: Option<String>,
    pub vehicle_count: usize,
    pub geofence_count: usize,
    pub selected: Option<String>,
    pub log_entries: usize,
}

/// Run a sync pass. A refresh pass keeps the current token and selection.
pub async fn sync_fleet(ctx: &AppContext, refresh: bool) -> DomainResult<FleetSnapshot> {
    let command = if refresh { "fleet::refresh" } else { "fleet::sync" };
    execute_command(command, move || async move {
        let snapshot = ctx.sync.sync(refresh).await?;
        Ok(FleetSnapshot::clone(&snapshot))
    })
    .await
}

pub fn list_vehicles(ctx: &AppContext) -> Vec<VehicleRecord> {
    ctx.sync.snapshot().vehicles().to_vec()
}

pub fn list_geofences(ctx: &AppContext) -> Vec<Geofence> {
    ctx.sync.snapshot().geofences().to_vec()
}

/// Select a vehicle by uuid and return it.
///
/// # Errors
/// `FleetError::Validation` when no vehicle has that uuid.
pub fn select_vehicle(ctx: &AppContext, uuid: &str) -> DomainResult<VehicleRecord> {
    let snapshot = ctx.sync.select(uuid)?;
    snapshot
        .selected_vehicle()
        .cloned()
        .ok_or_else(|| FleetError::internal("selection was not published"))
}

pub fn clear_selection(ctx: &AppContext) {
    ctx.sync.clear_selection();
}

pub fn fleet_status(ctx: &AppContext) -> FleetStatus {
    let snapshot = ctx.sync.snapshot();
    FleetStatus {
        phase: ctx.sync.phase(),
        token_state: ctx.sync.token_state().to_string(),
        last_error: ctx.sync.last_error().map(|e| e.user_message()),
        vehicle_count: snapshot.vehicles().len(),
        geofence_count: snapshot.geofences().len(),
        selected: snapshot.selected().map(str::to_string),
        log_entries: ctx.audit.len(),
    }
}
