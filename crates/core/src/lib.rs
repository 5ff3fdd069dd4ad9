//! # RavenFleet Core
//!
//! Data-acquisition pipeline between a dashboard and the fleet API.
//!
//! This crate contains:
//! - The request/response audit log
//! - Token lifecycle with single-flight refresh
//! - The fleet sync orchestrator and its published snapshot
//! - Port interfaces (traits) implemented by `ravenfleet-infra`
//!
//! ## Architecture Principles
//! - Only depends on `ravenfleet-common` and `ravenfleet-domain`
//! - No HTTP or filesystem code
//! - All external dependencies via traits

pub mod audit;
pub mod auth;
pub mod fleet;
pub mod session;

pub use audit::AuditLog;
pub use auth::{AuthGateway, SessionToken, TokenManager, TokenState};
pub use fleet::{
    CredentialVault, FleetApi, FleetSnapshot, FleetSync, FleetSyncBuilder, KeyValueStore,
    SyncPhase, VinDecoder,
};
pub use session::SessionHandle;
