//! Conversion from JSON values, used for caller-supplied metadata.

use serde_json::Value;

use crate::{AmfValue, Properties};

impl From<&Value> for AmfValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AmfValue::Null,
            Value::Bool(b) => AmfValue::Boolean(*b),
            Value::Number(n) => AmfValue::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => AmfValue::String(s.clone()),
            Value::Array(items) => AmfValue::StrictArray(items.iter().map(AmfValue::from).collect()),
            Value::Object(map) => AmfValue::Object(properties_from_json(map)),
        }
    }
}

/// Build a property list from a JSON object, keeping its iteration order.
pub fn properties_from_json(map: &serde_json::Map<String, Value>) -> Properties {
    map.iter()
        .map(|(name, value)| (name.clone(), AmfValue::from(value)))
        .collect()
}
