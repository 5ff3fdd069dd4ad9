//! # RavenFleet API
//!
//! Application layer - commands and main entry point.
//!
//! This crate contains:
//! - Commands (front-end → backend bridge)
//! - Application context (dependency injection)
//! - Tracing setup and command logging
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Provides the `ravenfleet` command-line entry point

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
