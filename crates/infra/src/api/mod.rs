//! Fleet telemetry API adapter
//!
//! Login, vehicle list, geofence list and vehicle details over the audited
//! HTTP exchange.

pub mod client;
mod payload;

pub use client::RavenApiClient;
