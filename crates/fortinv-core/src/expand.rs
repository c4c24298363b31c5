// ── Row expansion ──
//
// Fans one source record out into the units that each become a canonical
// row. Expansion only borrows from the source record; nothing is copied
// until a mapper writes the canonical record.

use serde_json::{Map, Value};

use crate::codes::{CodeTable, CodeTables, STANDALONE};
use crate::error::{CoreError, json_type_name};
use crate::model::{FieldAccess, SourceRecord};

/// Per-row side data produced by expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum SubContext<'a> {
    /// The record maps to a single row.
    None,
    /// One member of an HA cluster.
    HaMember {
        member: &'a Map<String, Value>,
        cluster_name: String,
    },
    /// One support contract.
    Contract(&'a Map<String, Value>),
    /// One entitlement.
    Entitlement(&'a Map<String, Value>),
    /// The device has no contract or entitlement at all.
    NoCoverage,
}

impl SubContext<'_> {
    /// The nested sub-record, if this unit carries one.
    pub fn record(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::HaMember { member, .. } => Some(*member),
            Self::Contract(entry) | Self::Entitlement(entry) => Some(*entry),
            Self::None | Self::NoCoverage => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "single",
            Self::HaMember { .. } => "ha-member",
            Self::Contract(_) => "contract",
            Self::Entitlement(_) => "entitlement",
            Self::NoCoverage => "no-coverage",
        }
    }
}

/// One `(source record, sub-context)` pair: the input of a single mapper call.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit<'a> {
    pub record: &'a SourceRecord,
    pub sub: SubContext<'a>,
}

/// How a source record turns into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionRule {
    /// Exactly one row per record.
    Single,
    /// One row per HA member when the record is clustered.
    HaMembers {
        mode_key: &'static str,
        members_key: &'static str,
        cluster_key: &'static str,
    },
    /// One row per contract, then one per entitlement; a single
    /// "no coverage" row when the device has neither.
    Coverage {
        contracts_key: &'static str,
        entitlements_key: Option<&'static str>,
    },
}

impl ExpansionRule {
    /// FortiManager device database HA layout.
    pub const FORTIMANAGER_HA: Self = Self::HaMembers {
        mode_key: "ha_mode",
        members_key: "ha_slave",
        cluster_key: "ha_group_name",
    };

    /// Expand `record` (at position `index` in its batch).
    ///
    /// Always yields at least one unit. Fails only when an expansion list is
    /// present but is not a list of objects.
    pub fn expand<'a>(
        self,
        record: &'a SourceRecord,
        index: usize,
        tables: &CodeTables,
    ) -> Result<Vec<Unit<'a>>, CoreError> {
        let unit = |sub| Unit { record, sub };

        match self {
            Self::Single => Ok(vec![unit(SubContext::None)]),

            Self::HaMembers {
                mode_key,
                members_key,
                cluster_key,
            } => {
                let members = object_list(record, members_key, index)?;
                let mode = tables.translate_value(CodeTable::HaMode, record.field(mode_key), Some(0));
                if mode == STANDALONE || members.is_empty() {
                    return Ok(vec![unit(SubContext::None)]);
                }
                let cluster_name = record.text(cluster_key);
                Ok(members
                    .into_iter()
                    .map(|member| {
                        unit(SubContext::HaMember {
                            member,
                            cluster_name: cluster_name.clone(),
                        })
                    })
                    .collect())
            }

            Self::Coverage {
                contracts_key,
                entitlements_key,
            } => {
                let mut units: Vec<Unit<'a>> = object_list(record, contracts_key, index)?
                    .into_iter()
                    .map(|c| unit(SubContext::Contract(c)))
                    .collect();
                if let Some(key) = entitlements_key {
                    units.extend(
                        object_list(record, key, index)?
                            .into_iter()
                            .map(|e| unit(SubContext::Entitlement(e))),
                    );
                }
                if units.is_empty() {
                    units.push(unit(SubContext::NoCoverage));
                }
                Ok(units)
            }
        }
    }
}

/// Borrow the objects of list `key`. Absent or null counts as empty.
fn object_list<'a>(
    record: &'a SourceRecord,
    key: &'static str,
    index: usize,
) -> Result<Vec<&'a Map<String, Value>>, CoreError> {
    let items = match record.field(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(CoreError::MalformedExpansion {
                key,
                index,
                expected: "a list",
                found: json_type_name(other),
            });
        }
    };

    items
        .iter()
        .map(|item| {
            item.as_object().ok_or(CoreError::MalformedExpansion {
                key,
                index,
                expected: "a list of objects",
                found: json_type_name(item),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const COVERAGE: ExpansionRule = ExpansionRule::Coverage {
        contracts_key: "contracts",
        entitlements_key: Some("entitlements"),
    };

    fn record(value: Value) -> SourceRecord {
        SourceRecord::from_value(value).unwrap()
    }

    #[test]
    fn clustered_controller_yields_one_unit_per_member() {
        let r = record(json!({
            "name": "edge-ha",
            "ha_mode": 3,
            "ha_group_name": "edge-cluster",
            "ha_slave": [
                {"sn": "FGT60F0000000001", "role": 1},
                {"sn": "FGT60F0000000002", "role": 0}
            ]
        }));
        let units = ExpansionRule::FORTIMANAGER_HA
            .expand(&r, 0, &CodeTables::fortinet())
            .unwrap();
        assert_eq!(units.len(), 2);
        for u in &units {
            match &u.sub {
                SubContext::HaMember { cluster_name, .. } => {
                    assert_eq!(cluster_name, "edge-cluster");
                }
                other => panic!("unexpected sub-context {other:?}"),
            }
        }
    }

    #[test]
    fn standalone_or_memberless_controller_yields_one_unit() {
        let tables = CodeTables::fortinet();
        let standalone = record(json!({"ha_mode": 0, "ha_slave": [{"sn": "A"}]}));
        let memberless = record(json!({"ha_mode": 2, "ha_slave": []}));
        let bare = record(json!({"sn": "FGT"}));
        for r in [&standalone, &memberless, &bare] {
            let units = ExpansionRule::FORTIMANAGER_HA.expand(r, 0, &tables).unwrap();
            assert_eq!(units.len(), 1);
            assert_eq!(units.first().map(|u| &u.sub), Some(&SubContext::None));
        }
    }

    #[test]
    fn coverage_lists_contracts_before_entitlements() {
        let r = record(json!({
            "contracts": [{"contractNumber": "C1"}],
            "entitlements": [{"levelDesc": "Web"}, {"levelDesc": "Phone"}]
        }));
        let units = COVERAGE.expand(&r, 0, &CodeTables::empty()).unwrap();
        let kinds: Vec<_> = units.iter().map(|u| u.sub.kind()).collect();
        assert_eq!(kinds, ["contract", "entitlement", "entitlement"]);
    }

    #[test]
    fn no_coverage_yields_sentinel_unit() {
        for r in [
            record(json!({"contracts": [], "entitlements": []})),
            record(json!({"contracts": null})),
            record(json!({})),
        ] {
            let units = COVERAGE.expand(&r, 0, &CodeTables::empty()).unwrap();
            assert_eq!(units.len(), 1);
            assert_eq!(units.first().map(|u| &u.sub), Some(&SubContext::NoCoverage));
        }
    }

    #[test]
    fn wrong_list_shape_is_structural_error() {
        let r = record(json!({"contracts": "C1"}));
        let err = COVERAGE.expand(&r, 4, &CodeTables::empty()).unwrap_err();
        assert!(!err.is_record_level());
        assert!(matches!(
            err,
            CoreError::MalformedExpansion {
                key: "contracts",
                index: 4,
                found: "a string",
                ..
            }
        ));

        let r = record(json!({"contracts": [1]}));
        assert!(COVERAGE.expand(&r, 0, &CodeTables::empty()).is_err());
    }
}
