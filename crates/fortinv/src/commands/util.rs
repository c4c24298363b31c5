//! Shared helpers for command handlers.

use std::path::Path;

use serde_json::Value;

use fortinv_core::SourceRecord;

use crate::error::CliError;

/// Keys under which the exporting APIs wrap their record lists.
const ENVELOPE_KEYS: &[&str] = &["assets", "results", "dataSet", "data", "accounts"];

/// Read a JSON file of source records. Accepts a bare array, a response
/// envelope keyed by one of [`ENVELOPE_KEYS`], or a JSON-RPC response
/// (`result[0].data`).
pub fn read_records(path: &Path) -> Result<Vec<SourceRecord>, CliError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::InputUnreadable {
        path: display.clone(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| CliError::InputJson {
        path: display.clone(),
        source,
    })?;

    let shape_err = || CliError::InputShape {
        path: display.clone(),
    };
    unwrap_envelope(value)
        .ok_or_else(shape_err)?
        .into_iter()
        .map(|item| SourceRecord::from_value(item).ok_or_else(shape_err))
        .collect()
}

/// The record list inside `value`, if it has one of the known shapes.
fn unwrap_envelope(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut object) => {
            if let Some(Value::Array(result)) = object.get_mut("result") {
                if let Some(data) = result.first_mut().and_then(|r| r.get_mut("data")) {
                    return match data.take() {
                        Value::Array(items) => Some(items),
                        _ => None,
                    };
                }
            }
            ENVELOPE_KEYS
                .iter()
                .find_map(|key| match object.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
        }
        _ => None,
    }
}
