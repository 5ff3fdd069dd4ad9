//! Resilience patterns for protecting the remote API
//!
//! - **Bounded fan-out**: caps the number of simultaneous calls to the
//!   downstream API while keeping results in input order.
//!
//! There is no retry layer. A failed sync is recovered by a full session
//! reset in the caller.

pub mod bounded;

pub use bounded::{run_bounded, ConcurrencyLimiter, LimiterConfigError};
