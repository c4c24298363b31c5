// ── Code tables ──
//
// Per-source enumerations translated into one canonical vocabulary. Tables
// are immutable once built and handed to mappers by reference. Unknown codes
// translate to an empty string so a bad code never costs a row.

use std::collections::HashMap;

use serde_json::Value;
use strum::{Display, EnumIter};

use crate::model::value_int;

/// Canonical HA-mode label for a unit outside any cluster.
pub const STANDALONE: &str = "Standalone";

/// Identifies one enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CodeTable {
    ConnectionStatus,
    HaMode,
    HaRole,
    MemberStatus,
    ManagementMode,
}

#[derive(Debug, Clone, Default)]
struct Table {
    codes: HashMap<i64, String>,
    /// Lower-cased textual spellings.
    aliases: HashMap<String, String>,
}

/// Immutable set of code tables.
#[derive(Debug, Clone, Default)]
pub struct CodeTables {
    tables: HashMap<CodeTable, Table>,
}

impl CodeTables {
    /// Tables with no entries; every lookup yields an empty string.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The Fortinet vocabulary shared by all three adapters.
    pub fn fortinet() -> Self {
        Self::empty()
            .with_codes(
                CodeTable::ConnectionStatus,
                &[(0, "Unknown"), (1, "Connected"), (2, "Disconnected")],
            )
            .with_aliases(
                CodeTable::ConnectionStatus,
                &[
                    ("connected", "Connected"),
                    ("authorized", "Connected"),
                    ("online", "Connected"),
                    ("up", "Connected"),
                    ("disconnected", "Disconnected"),
                    ("unauthorized", "Disconnected"),
                    ("offline", "Disconnected"),
                    ("down", "Disconnected"),
                    ("unknown", "Unknown"),
                ],
            )
            .with_codes(
                CodeTable::HaMode,
                &[
                    (0, STANDALONE),
                    (1, "Active-Active"),
                    (2, "Active-Passive"),
                    (3, "Cluster"),
                ],
            )
            .with_codes(
                CodeTable::HaRole,
                &[(0, "Secondary"), (1, "Primary"), (2, STANDALONE)],
            )
            .with_codes(
                CodeTable::MemberStatus,
                &[(0, "Offline"), (1, "Online"), (2, "Unknown")],
            )
            .with_codes(
                CodeTable::ManagementMode,
                &[(0, "Unreg"), (1, "FMGFAZ"), (2, "FMGFAI"), (3, "Normal")],
            )
    }

    pub fn with_codes(mut self, table: CodeTable, entries: &[(i64, &str)]) -> Self {
        let t = self.tables.entry(table).or_default();
        for (code, label) in entries {
            t.codes.insert(*code, (*label).to_owned());
        }
        self
    }

    pub fn with_aliases(mut self, table: CodeTable, entries: &[(&str, &str)]) -> Self {
        let t = self.tables.entry(table).or_default();
        for (alias, label) in entries {
            t.aliases.insert(alias.to_ascii_lowercase(), (*label).to_owned());
        }
        self
    }

    /// Translate a numeric code. Unknown codes yield `""`.
    pub fn translate(&self, table: CodeTable, code: i64) -> &str {
        self.tables
            .get(&table)
            .and_then(|t| t.codes.get(&code))
            .map_or("", String::as_str)
    }

    /// Translate a textual code: numeric strings go through the code table,
    /// anything else through the case-insensitive alias table.
    pub fn translate_text(&self, table: CodeTable, raw: &str) -> &str {
        let raw = raw.trim();
        if let Ok(code) = raw.parse::<i64>() {
            return self.translate(table, code);
        }
        if raw.is_empty() {
            return "";
        }
        self.tables
            .get(&table)
            .and_then(|t| t.aliases.get(&raw.to_ascii_lowercase()))
            .map_or("", String::as_str)
    }

    /// Translate a raw JSON value. `default` stands in for an absent or
    /// null value; a present value that cannot be read yields `""`.
    pub fn translate_value(
        &self,
        table: CodeTable,
        value: Option<&Value>,
        default: Option<i64>,
    ) -> &str {
        match value {
            None | Some(Value::Null) => default.map_or("", |code| self.translate(table, code)),
            Some(Value::String(s)) => self.translate_text(table, s),
            Some(other) => value_int(other).map_or("", |code| self.translate(table, code)),
        }
    }
}
