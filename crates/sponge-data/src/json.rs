//! JSON bridge.
//!
//! Views serialize as JSON objects in insertion order, arrays and lists as
//! JSON arrays and chars as one-character strings. Loading goes the other
//! way: objects become views, arrays become lists, integers become `Int`
//! when they fit and `Long` otherwise, other numbers become `Double`. JSON
//! `null` has no counterpart and is skipped.

use serde_json::{Map, Number, Value};
use sponge_data_query::DataQuery;

use crate::error::DataError;
use crate::input::DataInput;
use crate::safety::SafetyMode;
use crate::value::DataValue;
use crate::view::{DataContainer, DataView};

/// Renders a view as a JSON value.
pub fn to_json(view: &DataView) -> Result<Value, DataError> {
    serde_json::to_value(view).map_err(|e| DataError::Serialization(e.to_string()))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number(n: &Number) -> DataValue {
    if let Some(v) = n.as_i64() {
        return match i32::try_from(v) {
            Ok(v) => DataValue::Int(v),
            Err(_) => DataValue::Long(v),
        };
    }
    DataValue::Double(n.as_f64().unwrap_or(f64::NAN))
}

fn input(value: &Value, safety: SafetyMode) -> Result<Option<DataInput>, DataError> {
    Ok(Some(match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => DataInput::from(*b),
        Value::Number(n) => DataInput::Value(number(n)),
        Value::String(s) => DataInput::from(s),
        Value::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                let element = match item {
                    // Objects inside arrays stay addressable as views.
                    Value::Object(map) => Some(DataInput::View(load(map, safety)?.into_view())),
                    other => input(other, safety)?,
                };
                list.extend(element);
            }
            DataInput::List(list)
        }
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                if let Some(value) = input(value, safety)? {
                    entries.push((key.clone(), value));
                }
            }
            DataInput::Map(entries)
        }
    }))
}

fn load(map: &Map<String, Value>, safety: SafetyMode) -> Result<DataContainer, DataError> {
    let container = DataContainer::with_safety(safety);
    for (key, value) in map {
        if let Some(value) = input(value, safety)? {
            container.set(DataQuery::of([key.as_str()]), value)?;
        }
    }
    Ok(container)
}

impl DataContainer {
    /// Loads a JSON object into a new container.
    ///
    /// # Errors
    ///
    /// [`DataError::NotAnObject`] if `json` is not an object.
    pub fn from_json(json: &Value, safety: SafetyMode) -> Result<DataContainer, DataError> {
        match json {
            Value::Object(map) => load(map, safety),
            other => Err(DataError::NotAnObject(json_type(other))),
        }
    }

    /// Parses JSON text into a new container.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidData`] for malformed JSON, otherwise as
    /// [`DataContainer::from_json`].
    pub fn from_json_str(text: &str, safety: SafetyMode) -> Result<DataContainer, DataError> {
        let json: Value = serde_json::from_str(text).map_err(|e| DataError::InvalidData(e.to_string()))?;
        Self::from_json(&json, safety)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_preserves_order() {
        let doc = json!({"z": 1, "a": {"k": "v", "n": [1, 2.5, true]}, "m": 1});
        let container = DataContainer::from_json(&doc, SafetyMode::default()).unwrap();
        assert_eq!(to_json(&container).unwrap(), doc);
        let text = serde_json::to_string(&to_json(&container).unwrap()).unwrap();
        assert!(text.starts_with("{\"z\""));
    }

    #[test]
    fn test_number_widths() {
        let doc = json!({"small": 5, "big": 5_000_000_000i64, "real": 0.25});
        let container = DataContainer::from_json(&doc, SafetyMode::default()).unwrap();
        assert_eq!(container.get("small"), Some(DataValue::Int(5)));
        assert_eq!(container.get("big"), Some(DataValue::Long(5_000_000_000)));
        assert_eq!(container.get("real"), Some(DataValue::Double(0.25)));
    }

    #[test]
    fn test_dotted_keys_stay_single_segments() {
        let doc = json!({"a.b": 1});
        let container = DataContainer::from_json(&doc, SafetyMode::default()).unwrap();
        assert!(!container.contains("a"));
        assert_eq!(container.get(["a.b"]), Some(DataValue::Int(1)));
    }

    #[test]
    fn test_rendered_keys_address_dotted_segments() {
        let doc = json!({"a.b": {"c": 1}, "plain": true});
        let container = DataContainer::from_json(&doc, SafetyMode::default()).unwrap();
        let keys = container.keys(true);
        assert_eq!(keys.len(), 3);
        for key in keys {
            assert!(container.contains(key.to_string()), "{key} must be addressable");
        }
        assert_eq!(container.get_int(r"a\.b.c"), Some(1));
    }

    #[test]
    fn test_objects_in_arrays_become_views() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}]});
        let container = DataContainer::from_json(&doc, SafetyMode::default()).unwrap();
        let views = container.get_view_list("items").unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].get_int("id"), Some(2));
    }

    #[test]
    fn test_nulls_are_skipped() {
        let doc = json!({"a": null, "b": [null, 1]});
        let container = DataContainer::from_json(&doc, SafetyMode::default()).unwrap();
        assert!(!container.contains("a"));
        assert_eq!(container.get_int_list("b"), Some(vec![1]));
    }

    #[test]
    fn test_root_must_be_object() {
        assert_eq!(
            DataContainer::from_json(&json!([1]), SafetyMode::default()).unwrap_err(),
            DataError::NotAnObject("array")
        );
        assert!(matches!(
            DataContainer::from_json_str("{", SafetyMode::default()),
            Err(DataError::InvalidData(_))
        ));
    }
}
