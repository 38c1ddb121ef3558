use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, TabkitError};

/// Locate the record array inside a payload.
///
/// Accepts a bare array, or an object whose record array sits under one of
/// `collection_keys`. An object with no recognized key but exactly one
/// array-valued field is accepted too. Anything else is a shape error: there
/// is nothing to normalize.
pub fn extract_records<'a>(payload: &'a Value, collection_keys: &[String]) -> Result<&'a [Value]> {
    match payload {
        Value::Array(items) => {
            debug!("payload is a bare array count={}", items.len());
            Ok(items)
        }
        Value::Object(map) => {
            for key in collection_keys {
                if let Some(Value::Array(items)) = map.get(key) {
                    info!("found '{}' array count={}", key, items.len());
                    return Ok(items);
                }
            }

            let arrays: Vec<(&String, &Vec<Value>)> = map
                .iter()
                .filter_map(|(k, v)| v.as_array().map(|a| (k, a)))
                .collect();

            if let [(key, items)] = arrays.as_slice() {
                debug!("no known collection key; using sole array field '{}'", key);
                return Ok(items.as_slice());
            }

            let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
            Err(TabkitError::Shape(format!(
                "object has no record array (keys: [{}], expected one of [{}])",
                keys.join(", "),
                collection_keys.join(", ")
            )))
        }
        other => Err(TabkitError::Shape(format!(
            "expected an array or object, found {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Follow a dotted path (`award.year`) through nested objects. Explicit
/// nulls count as absent so the next candidate path gets a chance.
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// First present value among the candidate paths.
pub fn first_present<'a>(record: &'a Value, paths: &[String]) -> Option<&'a Value> {
    paths.iter().find_map(|p| lookup(record, p))
}
