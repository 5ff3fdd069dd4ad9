//! Geofence list entries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{FleetError, Result};

/// A geofence as returned by the API. Fetched once per sync pass; the core
/// enforces no relationship to vehicles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Geofence {
    attributes: Map<String, Value>,
}

impl Geofence {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn uuid(&self) -> Option<&str> {
        self.attributes.get("uuid").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl TryFrom<Value> for Geofence {
    type Error = FleetError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(attributes) => Ok(Self { attributes }),
            _ => Err(FleetError::validation("geofence is not a JSON object")),
        }
    }
}

impl From<Geofence> for Value {
    fn from(geofence: Geofence) -> Self {
        Self::Object(geofence.attributes)
    }
}
