//! Conversions from external infrastructure errors into domain errors.

use ravenfleet_domain::FleetError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FleetError);

impl From<InfraError> for FleetError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FleetError> for InfraError {
    fn from(value: FleetError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoFleetError {
    fn into_fleet(self) -> FleetError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FleetError */
/* -------------------------------------------------------------------------- */

impl IntoFleetError for HttpError {
    fn into_fleet(self) -> FleetError {
        if self.is_timeout() {
            return FleetError::network("HTTP request timed out");
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return FleetError::network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return FleetError::validation(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return FleetError::network(format!("failed to read response body: {self}"));
        }

        FleetError::network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_fleet())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → FleetError */
/* -------------------------------------------------------------------------- */

impl IntoFleetError for std::io::Error {
    fn into_fleet(self) -> FleetError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::PermissionDenied => FleetError::storage(format!("permission denied: {self}")),
            ErrorKind::NotFound => FleetError::storage(format!("path not found: {self}")),
            _ => FleetError::storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_fleet())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → FleetError */
/* -------------------------------------------------------------------------- */

impl IntoFleetError for serde_json::Error {
    fn into_fleet(self) -> FleetError {
        FleetError::validation(format!("invalid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_fleet())
    }
}

impl IntoFleetError for toml::de::Error {
    fn into_fleet(self) -> FleetError {
        FleetError::config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_fleet())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
