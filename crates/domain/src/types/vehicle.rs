//! Raven vehicle types
//!
//! The remote API returns loosely-typed JSON objects. Only the identity
//! (`uuid`) and a handful of fields the dashboard relies on are checked; every
//! other key is carried through untouched so the UI can render it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{FleetError, Result};

/// Key holding the vehicle identity in summaries, details, and records.
pub const UUID_KEY: &str = "uuid";
/// Key holding the VIN reported by the device.
pub const VIN_KEY: &str = "vehicle_vin";

fn string_field<'a>(attributes: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    attributes.get(key).and_then(Value::as_str)
}

fn trimmed_vin(attributes: &Map<String, Value>) -> Option<&str> {
    string_field(attributes, VIN_KEY).map(str::trim).filter(|vin| !vin.is_empty())
}

/// One entry of the vehicle list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct VehicleSummary {
    uuid: String,
    attributes: Map<String, Value>,
}

impl VehicleSummary {
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn name(&self) -> Option<&str> {
        string_field(&self.attributes, "name")
    }

    /// IMEI as text; some firmware reports it as a number.
    pub fn imei(&self) -> Option<String> {
        match self.attributes.get("imei")? {
            Value::String(imei) => Some(imei.clone()),
            Value::Number(imei) => Some(imei.to_string()),
            _ => None,
        }
    }

    pub fn vin(&self) -> Option<&str> {
        trimmed_vin(&self.attributes)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl TryFrom<Value> for VehicleSummary {
    type Error = FleetError;

    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(attributes) = value else {
            return Err(FleetError::validation("vehicle summary is not a JSON object"));
        };
        let uuid = match attributes.get(UUID_KEY) {
            Some(Value::String(uuid)) if !uuid.trim().is_empty() => uuid.clone(),
            Some(_) => return Err(FleetError::validation("vehicle summary has a malformed uuid")),
            None => return Err(FleetError::validation("vehicle summary has no uuid")),
        };
        Ok(Self { uuid, attributes })
    }
}

impl From<VehicleSummary> for Value {
    fn from(summary: VehicleSummary) -> Self {
        Self::Object(summary.attributes)
    }
}

/// Detail payload for a single vehicle, keyed by the same uuid as its
/// summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct VehicleDetails {
    attributes: Map<String, Value>,
}

impl VehicleDetails {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn uuid(&self) -> Option<&str> {
        string_field(&self.attributes, UUID_KEY)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl TryFrom<Value> for VehicleDetails {
    type Error = FleetError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(attributes) => Ok(Self { attributes }),
            Value::Null => Ok(Self::default()),
            _ => Err(FleetError::validation("vehicle details are not a JSON object")),
        }
    }
}

impl From<VehicleDetails> for Value {
    fn from(details: VehicleDetails) -> Self {
        Self::Object(details.attributes)
    }
}

/// Result of decoding a VIN through the external lookup. Opaque to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleInfo {
    attributes: Map<String, Value>,
}

impl VehicleInfo {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn make(&self) -> Option<&str> {
        string_field(&self.attributes, "Make")
    }

    pub fn model(&self) -> Option<&str> {
        string_field(&self.attributes, "Model")
    }

    pub fn model_year(&self) -> Option<&str> {
        string_field(&self.attributes, "ModelYear")
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A fleet vehicle as shown on the dashboard: summary fields overridden by
/// detail fields, plus the optional VIN-decode result.
///
/// Built once per sync pass and never patched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(flatten)]
    attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vehicle_info: Option<VehicleInfo>,
}

impl VehicleRecord {
    /// Shallow-merge `details` over `summary`; detail keys win on collision.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` if the details carry a different uuid.
    pub fn merge(summary: VehicleSummary, details: VehicleDetails) -> Result<Self> {
        if let Some(detail_uuid) = details.uuid() {
            if detail_uuid != summary.uuid {
                return Err(FleetError::validation(format!(
                    "details for vehicle {} carry uuid {detail_uuid}",
                    summary.uuid
                )));
            }
        }

        let VehicleSummary { uuid, mut attributes } = summary;
        attributes.extend(details.attributes);
        attributes.insert(UUID_KEY.to_string(), Value::String(uuid));

        Ok(Self { attributes, vehicle_info: None })
    }

    pub fn with_vehicle_info(mut self, info: VehicleInfo) -> Self {
        self.vehicle_info = Some(info);
        self
    }

    pub fn uuid(&self) -> &str {
        string_field(&self.attributes, UUID_KEY).unwrap_or_default()
    }

    pub fn name(&self) -> Option<&str> {
        string_field(&self.attributes, "name")
    }

    /// VIN after the merge, so a VIN reported only by the details endpoint
    /// is still decoded.
    pub fn vin(&self) -> Option<&str> {
        trimmed_vin(&self.attributes)
    }

    pub fn vehicle_info(&self) -> Option<&VehicleInfo> {
        self.vehicle_info.as_ref()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}
