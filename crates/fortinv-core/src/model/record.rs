// ── Source-shaped input records ──
//
// Collaborators hand the engine already-parsed JSON objects. The engine only
// reads them; enrichment lands in the canonical record, never back here.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw device record in its source system's native shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord(Map<String, Value>);

impl SourceRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value, accepting objects only.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for SourceRecord {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for SourceRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// ── Value helpers ───────────────────────────────────────────────────

/// Render a scalar as text. Null, lists and objects render empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Read an integer code from a number or a numeric string.
pub fn value_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Loose truthiness as inventory tools use it: `0`, `""`, `false`,
/// `null` and empty collections are all "unset".
pub fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Read-only accessors shared by device records and their nested
/// sub-records (HA members, contracts, entitlements).
pub trait FieldAccess {
    fn field(&self, key: &str) -> Option<&Value>;

    /// Text of `key`, empty when absent.
    fn text(&self, key: &str) -> String {
        self.field(key).map(value_text).unwrap_or_default()
    }

    /// First non-empty text among `keys`.
    fn first_text(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| self.text(k))
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    /// Text of `key` only when the value is truthy (so `0` renders empty).
    fn truthy_text(&self, key: &str) -> String {
        self.field(key)
            .filter(|v| value_truthy(v))
            .map(value_text)
            .unwrap_or_default()
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(value_int)
    }

    fn flag(&self, key: &str) -> bool {
        self.field(key).is_some_and(value_truthy)
    }

    /// Walk nested objects, e.g. `["extra info", "adom"]`.
    fn path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.field(first)?, |value, key| value.get(*key))
    }

    fn path_text(&self, path: &[&str]) -> String {
        self.path(path).map(value_text).unwrap_or_default()
    }
}

impl FieldAccess for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl FieldAccess for SourceRecord {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}
