// ── Core error types ──
//
// Only structural problems surface as errors. Data-quality issues (unknown
// codes, unresolved parents, malformed dates) degrade to empty or
// pass-through values inside the mappers and never reach this type.

use thiserror::Error;

use crate::model::{DeviceType, SourceSystem};
use crate::pipeline::Stage;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Per-record failures ──────────────────────────────────────────
    /// The record has neither a serial number nor a name. The pipeline
    /// skips and counts it; it never becomes a blank row.
    #[error("{source_system} {device_type} record #{index} has neither a serial number nor a name")]
    MissingIdentity {
        source_system: SourceSystem,
        device_type: DeviceType,
        index: usize,
    },

    // ── Structural invocation errors ─────────────────────────────────
    #[error("expansion list '{key}' on record #{index} must be {expected}, found {found}")]
    MalformedExpansion {
        key: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("pipeline cannot move from {from} back to {to}")]
    StageOrder { from: Stage, to: Stage },
}

impl CoreError {
    /// Whether this error only disqualifies a single record.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::MissingIdentity { .. })
    }
}

/// Human-readable JSON type name for diagnostics.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
