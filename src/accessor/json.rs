//! Accessors over JSON-shaped records

use super::types::{Scalar, ValueAccessor};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Resolve a dotted path against a JSON value.
///
/// Object segments are looked up by key, numeric segments index arrays.
/// A leading `$.` is accepted and ignored.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Dotted-path accessor for `serde_json::Value` records.
///
/// Missing paths read as [`Scalar::Null`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAccessor;

impl ValueAccessor<Value> for JsonAccessor {
    fn get_value(&self, record: &Value, path: &str) -> Result<Scalar> {
        Ok(lookup_path(record, path).map_or(Scalar::Null, Scalar::from_json))
    }
}

/// Accessor for any `Serialize` record, resolved through its JSON form
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeAccessor;

impl<T: Serialize> ValueAccessor<T> for SerializeAccessor {
    fn get_value(&self, record: &T, path: &str) -> Result<Scalar> {
        let value = serde_json::to_value(record)
            .map_err(|e| Error::field_access(path, format!("record is not serializable: {e}")))?;
        JsonAccessor.get_value(&value, path)
    }
}
