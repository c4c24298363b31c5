// ── Field mappers ──
//
// One generic mapper driven by a declarative table per (source, device
// type) pair. Rules run in table order, so a rule may read columns that an
// earlier rule already filled. Columns without a rule stay empty.

mod forticloud;
mod fortimanager;
mod topdesk;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::codes::{CodeTable, CodeTables};
use crate::convert::{epoch_timestamp, format_timestamp, model_from_firmware, normalize_date};
use crate::error::CoreError;
use crate::expand::{ExpansionRule, SubContext};
use crate::model::{CanonicalRecord, DeviceType, Field, FieldAccess, SourceRecord, SourceSystem};
use crate::store::{AccountContext, ParentContext};

/// Literal written to the `Vendor` column by every adapter.
pub const VENDOR: &str = "Fortinet";

/// Sentinel written to coverage columns when a device has no contract.
pub const NO_COVERAGE: &str = "No Coverage";

// ── Rule vocabulary ─────────────────────────────────────────────────

/// Computes a column from the full mapper input and the row built so far.
pub type Derive = fn(&MapInput<'_>, &CanonicalRecord) -> String;

/// Which record a rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The device record itself.
    Record,
    /// The HA member sub-record; empty on other rows.
    Member,
    /// The HA member on member rows, else the device record.
    Unit,
    /// Like `Unit`, and an empty member value falls back to the device
    /// record.
    MemberOrRecord,
    /// The contract sub-record; empty on other rows.
    Contract,
    /// The entitlement sub-record; empty on other rows.
    Entitlement,
}

/// How a column value is obtained.
#[derive(Clone, Copy)]
pub enum Extract {
    Const(&'static str),
    /// First non-empty value among the keys.
    Text(&'static [&'static str]),
    /// Like `Text`, with a fallback literal.
    TextOr(&'static [&'static str], &'static str),
    /// Value of the key only when truthy, so `0` renders empty.
    Truthy(&'static str),
    /// Nested object walk.
    Path(&'static [&'static str]),
    /// Code-table translation; `default` stands in for an absent code.
    Code {
        key: &'static str,
        table: CodeTable,
        default: Option<i64>,
    },
    /// Date normalized to `YYYY-MM-DD`.
    Date(&'static str),
    /// Epoch seconds rendered as a UTC timestamp.
    Epoch(&'static str),
    /// Truthiness rendered `Yes`/`No`.
    YesNo(&'static str),
    /// Direct model keys, else the model encoded in a firmware image
    /// string.
    ModelOrFirmware {
        keys: &'static [&'static str],
        firmware: &'static str,
    },
    /// Native description, else `"<Model> <noun>"` from the mapped model.
    Describe(&'static [&'static str]),
    /// First non-empty column already mapped.
    Column(&'static [Field]),
    /// One of the four parent-tracking columns.
    Parent(Field),
    /// The parent controller's administrative domain.
    ParentAdom,
    /// The pipeline run timestamp.
    AsOf,
    Derive(Derive),
}

/// One column of a mapping table.
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub scope: Scope,
    pub extract: Extract,
}

pub const fn rec(field: Field, extract: Extract) -> FieldRule {
    FieldRule {
        field,
        scope: Scope::Record,
        extract,
    }
}

pub const fn member(field: Field, extract: Extract) -> FieldRule {
    FieldRule {
        field,
        scope: Scope::Member,
        extract,
    }
}

pub const fn unit(field: Field, extract: Extract) -> FieldRule {
    FieldRule {
        field,
        scope: Scope::Unit,
        extract,
    }
}

pub const fn member_or_rec(field: Field, extract: Extract) -> FieldRule {
    FieldRule {
        field,
        scope: Scope::MemberOrRecord,
        extract,
    }
}

pub const fn contract(field: Field, extract: Extract) -> FieldRule {
    FieldRule {
        field,
        scope: Scope::Contract,
        extract,
    }
}

pub const fn entitlement(field: Field, extract: Extract) -> FieldRule {
    FieldRule {
        field,
        scope: Scope::Entitlement,
        extract,
    }
}

/// Declarative mapping for one (source, device type) pair.
pub struct MappingTable {
    pub source: SourceSystem,
    pub device_type: DeviceType,
    pub expansion: ExpansionRule,
    pub rules: &'static [FieldRule],
}

/// The mapping table for a (source, device type) pair.
pub fn table_for(source: SourceSystem, device_type: DeviceType) -> &'static MappingTable {
    match (source, device_type) {
        (SourceSystem::FortiManager, DeviceType::Firewall) => &fortimanager::FIREWALL,
        (SourceSystem::FortiManager, DeviceType::Switch) => &fortimanager::SWITCH,
        (SourceSystem::FortiManager, DeviceType::AccessPoint) => &fortimanager::ACCESS_POINT,
        (SourceSystem::FortiCloud, DeviceType::Firewall) => &forticloud::FIREWALL,
        (SourceSystem::FortiCloud, DeviceType::Switch) => &forticloud::SWITCH,
        (SourceSystem::FortiCloud, DeviceType::AccessPoint) => &forticloud::ACCESS_POINT,
        (SourceSystem::TopDesk, DeviceType::Firewall) => &topdesk::FIREWALL,
        (SourceSystem::TopDesk, DeviceType::Switch) => &topdesk::SWITCH,
        (SourceSystem::TopDesk, DeviceType::AccessPoint) => &topdesk::ACCESS_POINT,
    }
}

// ── Mapper input ────────────────────────────────────────────────────

/// Side data looked up for one record before mapping.
#[derive(Debug, Clone, Copy)]
pub struct Enrichment<'a> {
    pub parent: &'a ParentContext,
    pub account: &'a AccountContext,
}

impl Enrichment<'static> {
    /// No parent and no account.
    pub fn none() -> Self {
        Self {
            parent: ParentContext::none(),
            account: AccountContext::none(),
        }
    }
}

impl Default for Enrichment<'static> {
    fn default() -> Self {
        Self::none()
    }
}

/// Everything a rule may read while mapping one unit.
pub struct MapInput<'a> {
    pub record: &'a SourceRecord,
    pub sub: &'a SubContext<'a>,
    pub enrichment: Enrichment<'a>,
    pub tables: &'a CodeTables,
    pub as_of: &'a DateTime<Utc>,
    pub device_type: DeviceType,
}

impl MapInput<'_> {
    fn scoped(&self, scope: Scope) -> Option<&Map<String, Value>> {
        let record: &Map<String, Value> = self.record;
        match (scope, self.sub) {
            (Scope::Record, _) => Some(record),
            (
                Scope::Member | Scope::Unit | Scope::MemberOrRecord,
                SubContext::HaMember { member, .. },
            ) => Some(*member),
            (Scope::Unit | Scope::MemberOrRecord, _) => Some(record),
            (Scope::Contract, SubContext::Contract(entry))
            | (Scope::Entitlement, SubContext::Entitlement(entry)) => Some(*entry),
            _ => None,
        }
    }
}

impl FieldRule {
    fn eval(&self, input: &MapInput<'_>, row: &CanonicalRecord) -> String {
        let value = self.extract.eval(input.scoped(self.scope), input, row);
        // A member value that is empty falls back to the device record.
        if value.is_empty()
            && self.scope == Scope::MemberOrRecord
            && matches!(input.sub, SubContext::HaMember { .. })
        {
            return self.extract.eval(Some(&**input.record), input, row);
        }
        value
    }
}

impl Extract {
    fn eval(
        &self,
        src: Option<&Map<String, Value>>,
        input: &MapInput<'_>,
        row: &CanonicalRecord,
    ) -> String {
        let read = |f: &dyn Fn(&Map<String, Value>) -> String| src.map(f).unwrap_or_default();

        match *self {
            Self::Const(value) => value.to_owned(),
            Self::Text(keys) => read(&|m| m.first_text(keys)),
            Self::TextOr(keys, fallback) => {
                let value = read(&|m| m.first_text(keys));
                if value.is_empty() {
                    fallback.to_owned()
                } else {
                    value
                }
            }
            Self::Truthy(key) => read(&|m| m.truthy_text(key)),
            Self::Path(path) => read(&|m| m.path_text(path)),
            Self::Code {
                key,
                table,
                default,
            } => read(&|m| {
                input
                    .tables
                    .translate_value(table, m.field(key), default)
                    .to_owned()
            }),
            Self::Date(key) => read(&|m| normalize_date(&m.text(key))),
            Self::Epoch(key) => read(&|m| m.int(key).map(epoch_timestamp).unwrap_or_default()),
            Self::YesNo(key) => read(&|m| yes_no(m.flag(key)).to_owned()),
            Self::ModelOrFirmware { keys, firmware } => read(&|m| {
                let model = m.first_text(keys);
                if model.is_empty() {
                    model_from_firmware(&m.text(firmware), input.device_type)
                } else {
                    model
                }
            }),
            Self::Describe(keys) => {
                let native = read(&|m| m.first_text(keys));
                if native.is_empty() {
                    describe(input.device_type, row)
                } else {
                    native
                }
            }
            Self::Column(fields) => fields
                .iter()
                .map(|f| row.get(*f))
                .find(|v| !v.is_empty())
                .unwrap_or_default()
                .to_owned(),
            Self::Parent(field) => input.enrichment.parent.column(field).to_owned(),
            Self::ParentAdom => input.enrichment.parent.adom.clone(),
            Self::AsOf => format_timestamp(input.as_of),
            Self::Derive(f) => f(input, row),
        }
    }
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// `"<Model> <noun>"`, or empty when no model was mapped.
pub(crate) fn describe(device_type: DeviceType, row: &CanonicalRecord) -> String {
    let model = row.get(Field::Model);
    if model.is_empty() {
        String::new()
    } else {
        format!("{model} {}", device_type.asset_type())
    }
}

// ── Mapper ──────────────────────────────────────────────────────────

/// Pure `(record, sub-context, enrichment) -> canonical record` function
/// for one (source, device type) pair.
#[derive(Clone, Copy)]
pub struct Mapper<'t> {
    table: &'static MappingTable,
    tables: &'t CodeTables,
    as_of: DateTime<Utc>,
}

impl<'t> Mapper<'t> {
    pub fn new(
        source: SourceSystem,
        device_type: DeviceType,
        tables: &'t CodeTables,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            table: table_for(source, device_type),
            tables,
            as_of,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.table.device_type
    }

    pub fn expansion(&self) -> ExpansionRule {
        self.table.expansion
    }

    /// Map one expanded unit. `index` is the record's batch position, used
    /// only to report a record without identity.
    pub fn map(
        &self,
        record: &SourceRecord,
        sub: &SubContext<'_>,
        enrichment: Enrichment<'_>,
        index: usize,
    ) -> Result<CanonicalRecord, CoreError> {
        let input = MapInput {
            record,
            sub,
            enrichment,
            tables: self.tables,
            as_of: &self.as_of,
            device_type: self.table.device_type,
        };

        let mut row = CanonicalRecord::new();
        row.set(Field::AssetType, self.table.device_type.asset_type());
        row.set(Field::SourceSystem, self.table.source.label());
        row.set(Field::Vendor, VENDOR);
        for rule in self.table.rules {
            let value = rule.eval(&input, &row);
            row.set(rule.field, value);
        }

        if row.serial().is_empty() && row.get(Field::DeviceName).is_empty() {
            return Err(CoreError::MissingIdentity {
                source_system: self.table.source,
                device_type: self.table.device_type,
                index,
            });
        }
        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn every_pair_has_a_table() {
        for source in SourceSystem::iter() {
            for device_type in DeviceType::iter() {
                let table = table_for(source, device_type);
                assert_eq!(table.source, source);
                assert_eq!(table.device_type, device_type);
            }
        }
    }

    #[test]
    fn tables_assign_each_column_once() {
        for source in SourceSystem::iter() {
            for device_type in DeviceType::iter() {
                let table = table_for(source, device_type);
                let mut seen = HashSet::new();
                for rule in table.rules {
                    assert!(
                        seen.insert(rule.field),
                        "{source} {device_type} maps {} twice",
                        rule.field
                    );
                    assert!(
                        !matches!(rule.field, Field::AssetType | Field::SourceSystem | Field::Vendor),
                        "{} is fixed by the mapper",
                        rule.field
                    );
                }
            }
        }
    }

    #[test]
    fn describe_needs_a_model() {
        let mut row = CanonicalRecord::new();
        assert_eq!(describe(DeviceType::Switch, &row), "");
        row.set(Field::Model, "FortiSwitch-224EN");
        assert_eq!(describe(DeviceType::Switch, &row), "FortiSwitch-224EN Switch");
    }
}
