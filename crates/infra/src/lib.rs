//! # RavenFleet Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP transport and the audited exchange
//! - The fleet API adapter (login, lists, details)
//! - NHTSA VIN decoding
//! - File and in-memory key-value stores
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `ravenfleet-core`
//! - Depends on `ravenfleet-domain` and `ravenfleet-core`
//! - Contains all "impure" code (network, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;
pub mod vin;

// Re-export commonly used items
pub use api::RavenApiClient;
pub use errors::InfraError;
pub use http::{ExchangeRequest, HttpClient, HttpClientBuilder, HttpExchange};
pub use storage::{JsonFileStore, MemoryStore};
pub use vin::NhtsaVinDecoder;
