//! Testing utilities and helpers
//!
//! - **[`probe`]**: concurrency probe that records how many workers were
//!   active at the same time

pub mod probe;

pub use probe::{ConcurrencyProbe, ProbeGuard};
