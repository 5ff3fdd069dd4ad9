//! Modular common utilities shared across RavenFleet crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: async infrastructure (bounded fan-out)
//! - `test-utils`: probes and helpers for concurrency tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

#[cfg(feature = "runtime")]
pub use resilience::{run_bounded, ConcurrencyLimiter, LimiterConfigError};
