//! Domain types and models

pub mod audit;
pub mod credentials;
pub mod geofence;
pub mod vehicle;

pub use audit::{AuditLogEntry, AuditRecord, AuditRequest, AuditResponse};
pub use credentials::Credentials;
pub use geofence::Geofence;
pub use vehicle::{VehicleDetails, VehicleInfo, VehicleRecord, VehicleSummary};
