// ── TopDesk mapping tables ──
//
// Asset records from the asset-management API, each enriched with its
// linked support contracts under `contracts`.

use serde_json::Value;

use super::{
    Extract::{self, Date, Derive, Describe, Parent, Text, YesNo},
    FieldRule, MapInput, MappingTable, NO_COVERAGE, contract, rec, yes_no,
};
use crate::codes::CodeTable;
use crate::convert::{extract_serial, model_from_summary};
use crate::expand::{ExpansionRule, SubContext};
use crate::model::{CanonicalRecord, DeviceType, Field, FieldAccess, SourceSystem};

const COVERAGE: ExpansionRule = ExpansionRule::Coverage {
    contracts_key: "contracts",
    entitlements_key: None,
};

/// TopDesk renders missing values as this placeholder.
const PLACEHOLDER: &str = "N/A";

fn clean(value: String) -> String {
    if value == PLACEHOLDER { String::new() } else { value }
}

/// Serial from the asset field, else one embedded in a linked contract
/// name, the summary or the asset name.
fn serial(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    let r = input.record;
    let native = clean(r.text("serienummer"));
    if !native.is_empty() {
        return native;
    }

    let contract_names = r
        .get("contracts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|c| c.get("name").map(crate::model::value_text).unwrap_or_default());
    contract_names
        .chain([r.text("@@summary"), r.text("name")])
        .find_map(|text| extract_serial(&text, input.device_type))
        .unwrap_or_default()
}

fn model(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    let native = clean(input.record.text("model"));
    if native.is_empty() {
        model_from_summary(&input.record.text("@@summary"), input.device_type)
    } else {
        native
    }
}

/// First location assignment. `@assignments` is either an object holding
/// a `locations` list or the list itself.
fn first_location<'a>(input: &MapInput<'a>) -> Option<&'a Value> {
    let assignments = input.record.get("@assignments")?;
    let locations = match assignments {
        Value::Object(o) => o.get("locations")?,
        list => list,
    };
    locations.as_array()?.first()
}

fn branch(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    first_location(input)
        .and_then(|l| l.get("branch"))
        .and_then(|b| b.get("name"))
        .map(crate::model::value_text)
        .map(clean)
        .unwrap_or_default()
}

fn location(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    first_location(input)
        .and_then(|l| l.get("location"))
        .and_then(|b| b.get("name"))
        .map(crate::model::value_text)
        .map(clean)
        .unwrap_or_default()
}

fn contract_status(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    match input.sub {
        SubContext::Contract(c) => clean(c.text("status")),
        SubContext::NoCoverage => NO_COVERAGE.to_owned(),
        _ => String::new(),
    }
}

fn contract_archived(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    match input.sub {
        SubContext::Contract(c) => yes_no(c.flag("archived")).to_owned(),
        _ => String::new(),
    }
}

static RULES: &[FieldRule] = &[
    rec(Field::SerialNumber, Derive(serial)),
    rec(Field::DeviceName, Text(&["name"])),
    rec(Field::Hostname, Text(&["host-name", "name"])),
    rec(Field::Model, Derive(model)),
    rec(Field::Description, Describe(&["@@summary"])),
    rec(Field::ManagementIp, Text(&["ip-address"])),
    rec(
        Field::ConnectionStatus,
        Extract::Code {
            key: "@status",
            table: CodeTable::ConnectionStatus,
            default: Some(0),
        },
    ),
    rec(Field::FirmwareVersion, Text(&["software-versie"])),
    rec(Field::Branch, Derive(branch)),
    rec(Field::Location, Derive(location)),
    contract(Field::ContractNumber, Text(&["name"])),
    contract(Field::ContractType, Text(&["type"])),
    contract(Field::ContractSummary, Text(&["summary"])),
    contract(Field::ContractStartDate, Date("start_date")),
    contract(Field::ContractExpirationDate, Date("expiration_date")),
    rec(Field::ContractStatus, Derive(contract_status)),
    rec(Field::ContractArchived, Derive(contract_archived)),
    rec(Field::Status, Text(&["@status"])),
    rec(Field::Archived, YesNo("archived")),
    rec(Field::LastUpdated, Date("modificationDate")),
    rec(Field::ParentName, Parent(Field::ParentName)),
    rec(Field::ParentSerial, Parent(Field::ParentSerial)),
    rec(Field::ParentPlatform, Parent(Field::ParentPlatform)),
    rec(Field::ParentIp, Parent(Field::ParentIp)),
];

pub(super) static FIREWALL: MappingTable = MappingTable {
    source: SourceSystem::TopDesk,
    device_type: DeviceType::Firewall,
    expansion: COVERAGE,
    rules: RULES,
};

pub(super) static SWITCH: MappingTable = MappingTable {
    source: SourceSystem::TopDesk,
    device_type: DeviceType::Switch,
    expansion: COVERAGE,
    rules: RULES,
};

pub(super) static ACCESS_POINT: MappingTable = MappingTable {
    source: SourceSystem::TopDesk,
    device_type: DeviceType::AccessPoint,
    expansion: COVERAGE,
    rules: RULES,
};
