//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// API defaults
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("ravenfleet/", env!("CARGO_PKG_VERSION"));

// Sync defaults
pub const DEFAULT_MAX_CONCURRENT_DETAILS: usize = 5;

// Credential persistence
pub const DEFAULT_CREDENTIALS_PATH: &str = "ravenfleet-credentials.json";
pub const DEFAULT_CREDENTIALS_KEY: &str = "ravenCredentials";

// VIN decoding (NHTSA vPIC)
pub const DEFAULT_VIN_BASE_URL: &str = "https://vpic.nhtsa.dot.gov/api";
pub const DEFAULT_VIN_TIMEOUT_SECS: u64 = 15;

// Redaction
pub const REDACTED: &str = "***";
