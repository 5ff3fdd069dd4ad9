//! Fleet synchronisation: ports, published state and the orchestrator

pub mod ports;
pub mod service;
pub mod state;
pub mod vault;

pub use ports::{FleetApi, KeyValueStore, VinDecoder};
pub use service::{FleetSync, FleetSyncBuilder};
pub use state::{FleetSnapshot, SyncPhase};
pub use vault::CredentialVault;
