//! Reading plugin configuration values.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Deserializes a plugin configuration object.
///
/// `null` reads as an empty object so that every field falls back to its
/// default. Anything other than an object or `null` is rejected.
pub fn parse_config<T: DeserializeOwned>(config: &Value) -> anyhow::Result<T> {
    let object = match config {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => config.clone(),
        other => anyhow::bail!("configuration must be a JSON object, got {}", type_name(other)),
    };
    Ok(serde_json::from_value(object)?)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
