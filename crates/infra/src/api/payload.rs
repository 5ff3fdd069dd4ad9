//! Response shapes accepted from the fleet API
//!
//! Deployments differ in how they wrap payloads: some return bare arrays,
//! others wrap them in `data`, `items` or `results`. The login endpoint may
//! answer with a bare JSON string or an object carrying the token.

use ravenfleet_domain::{FleetError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

const LIST_WRAPPERS: [&str; 3] = ["data", "items", "results"];
const TOKEN_KEYS: [&str; 3] = ["token", "access_token", "accessToken"];

/// Pull the list out of a list response and decode its entries.
pub fn decode_list<T: DeserializeOwned>(value: Value, what: &str) -> Result<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => LIST_WRAPPERS
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| FleetError::validation(format!("{what} response has no list")))?,
        other => {
            return Err(FleetError::validation(format!(
                "{what} response is {}, expected a list",
                kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| FleetError::validation(format!("invalid {what} entry: {e}")))
}

/// Unwrap a single-object response, looking through a `data` wrapper.
pub fn unwrap_object(value: Value) -> Value {
    match value {
        Value::Object(mut object) if object.len() == 1 && object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extract the bearer token from a login response.
pub fn extract_token(value: &Value) -> Option<String> {
    token_field(value)
        .or_else(|| value.get("data").and_then(token_field))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn token_field(value: &Value) -> Option<&str> {
    match value {
        Value::String(token) => Some(token.as_str()),
        Value::Object(object) => {
            TOKEN_KEYS.iter().find_map(|key| object.get(*key).and_then(Value::as_str))
        }
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
