// ── FortiCloud mapping tables ──
//
// Asset-management `products` records. One table serves every device type;
// the device type only changes the fixed literals and the description noun.

use serde_json::{Map, Value};

use super::{
    Extract::{self, Date, Derive, Describe, Parent, Text, Truthy, YesNo},
    FieldRule, MapInput, MappingTable, NO_COVERAGE, contract, entitlement, rec,
};
use crate::codes::CodeTable;
use crate::convert::{coverage_state, normalize_date};
use crate::expand::{ExpansionRule, SubContext};
use crate::model::{CanonicalRecord, DeviceType, Field, FieldAccess, SourceSystem};

const COVERAGE: ExpansionRule = ExpansionRule::Coverage {
    contracts_key: "contracts",
    entitlements_key: Some("entitlements"),
};

/// First term of a contract, where FortiCloud keeps dates and support type.
fn first_term<'a>(input: &MapInput<'a>) -> Option<&'a Map<String, Value>> {
    match input.sub {
        SubContext::Contract(c) => c
            .get("terms")
            .and_then(Value::as_array)
            .and_then(|terms| terms.first())
            .and_then(Value::as_object),
        _ => None,
    }
}

fn term_start(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    first_term(input)
        .map(|t| normalize_date(&t.text("startDate")))
        .unwrap_or_default()
}

fn term_end(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    first_term(input)
        .map(|t| normalize_date(&t.text("endDate")))
        .unwrap_or_default()
}

fn term_support_type(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    first_term(input)
        .map(|t| t.text("supportType"))
        .unwrap_or_default()
}

fn coverage_status(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    match input.sub {
        SubContext::Contract(_) if input.record.text("status") == "Registered" => {
            "OPERATIONAL".to_owned()
        }
        SubContext::Entitlement(e) => coverage_state(&e.text("endDate"), input.as_of).to_owned(),
        SubContext::NoCoverage => NO_COVERAGE.to_owned(),
        _ => String::new(),
    }
}

fn entitlement_level(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    match input.sub {
        SubContext::Entitlement(e) => e.text("levelDesc"),
        SubContext::NoCoverage => NO_COVERAGE.to_owned(),
        _ => String::new(),
    }
}

fn contract_archived(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    match input.sub {
        SubContext::Contract(_) => "No".to_owned(),
        _ => String::new(),
    }
}

fn account_company(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    input.enrichment.account.company.clone()
}

fn account_ou_name(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    input.enrichment.account.ou_name.clone()
}

fn account_email(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    input.enrichment.account.email.clone()
}

fn account_ou_id(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    input.enrichment.account.ou_id.clone()
}

static RULES: &[FieldRule] = &[
    rec(Field::SerialNumber, Text(&["serialNumber"])),
    rec(Field::DeviceName, Text(&["description"])),
    rec(Field::Model, Text(&["productModel"])),
    rec(Field::Description, Describe(&["description"])),
    rec(
        Field::ConnectionStatus,
        Extract::Code {
            key: "status",
            table: CodeTable::ConnectionStatus,
            default: Some(0),
        },
    ),
    rec(Field::Company, Derive(account_company)),
    rec(Field::OrganizationalUnit, Derive(account_ou_name)),
    rec(Field::FolderPath, Text(&["folderPath"])),
    rec(Field::FolderId, Truthy("folderId")),
    // Contract rows
    contract(Field::ContractNumber, Text(&["contractNumber"])),
    contract(Field::ContractSku, Text(&["sku"])),
    rec(Field::ContractStartDate, Derive(term_start)),
    rec(Field::ContractExpirationDate, Derive(term_end)),
    rec(Field::ContractStatus, Derive(coverage_status)),
    rec(Field::ContractSupportType, Derive(term_support_type)),
    rec(Field::ContractArchived, Derive(contract_archived)),
    // Entitlement rows
    rec(Field::EntitlementLevel, Derive(entitlement_level)),
    entitlement(Field::EntitlementType, Text(&["typeDesc"])),
    entitlement(Field::EntitlementStartDate, Date("startDate")),
    entitlement(Field::EntitlementEndDate, Date("endDate")),
    // Lifecycle
    rec(Field::Status, Text(&["status"])),
    rec(Field::IsDecommissioned, YesNo("isDecommissioned")),
    rec(Field::Archived, YesNo("isDecommissioned")),
    rec(Field::RegistrationDate, Date("registrationDate")),
    rec(Field::ProductEor, Date("productModelEoR")),
    rec(Field::ProductEos, Date("productModelEoS")),
    rec(Field::LastUpdated, Date("registrationDate")),
    rec(Field::AccountId, Truthy("accountId")),
    rec(Field::AccountEmail, Derive(account_email)),
    rec(Field::AccountOuId, Derive(account_ou_id)),
    rec(Field::ParentName, Parent(Field::ParentName)),
    rec(Field::ParentSerial, Parent(Field::ParentSerial)),
    rec(Field::ParentPlatform, Parent(Field::ParentPlatform)),
    rec(Field::ParentIp, Parent(Field::ParentIp)),
];

pub(super) static FIREWALL: MappingTable = MappingTable {
    source: SourceSystem::FortiCloud,
    device_type: DeviceType::Firewall,
    expansion: COVERAGE,
    rules: RULES,
};

pub(super) static SWITCH: MappingTable = MappingTable {
    source: SourceSystem::FortiCloud,
    device_type: DeviceType::Switch,
    expansion: COVERAGE,
    rules: RULES,
};

pub(super) static ACCESS_POINT: MappingTable = MappingTable {
    source: SourceSystem::FortiCloud,
    device_type: DeviceType::AccessPoint,
    expansion: COVERAGE,
    rules: RULES,
};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::codes::CodeTables;
    use crate::mapping::{Enrichment, Mapper, NO_COVERAGE};
    use crate::model::{CanonicalRecord, DeviceType, Field, SourceRecord, SourceSystem};
    use crate::store::{AccountDirectory, ParentContext};

    fn device() -> SourceRecord {
        SourceRecord::from_value(json!({
            "serialNumber": "FGT60F0000000001",
            "description": "branch-fw",
            "productModel": "FortiGate 60F",
            "status": "Registered",
            "folderPath": "/Acme/Branches",
            "folderId": 12,
            "isDecommissioned": false,
            "registrationDate": "2023-01-15T10:00:00",
            "productModelEoS": "N/A",
            "accountId": 1042,
            "contracts": [{
                "contractNumber": "4500012345",
                "sku": "FC-10-0060F-950-02-12",
                "terms": [{"startDate": "2024-01-01T00:00:00", "endDate": "2025-01-01T00:00:00", "supportType": "FortiCare Premium"}]
            }],
            "entitlements": [
                {"levelDesc": "Premium", "typeDesc": "Hardware", "startDate": "2024-01-01", "endDate": "2024-12-31"},
                {"levelDesc": "Premium", "typeDesc": "Firmware", "startDate": "2024-01-01", "endDate": "2026-12-31"}
            ]
        }))
        .unwrap()
    }

    fn rows(record: &SourceRecord) -> Vec<CanonicalRecord> {
        let tables = CodeTables::fortinet();
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mapper = Mapper::new(SourceSystem::FortiCloud, DeviceType::Firewall, &tables, as_of);
        let accounts = AccountDirectory::build(&[SourceRecord::from_value(json!({
            "id": 1042, "company": "Acme", "email": "noc@acme.example", "ou_name": "EMEA", "ou_id": 7
        }))
        .unwrap()]);
        let account = accounts.resolve(record);
        let enrichment = Enrichment {
            parent: ParentContext::none(),
            account: &account,
        };
        mapper
            .expansion()
            .expand(record, 0, &tables)
            .unwrap()
            .iter()
            .map(|u| mapper.map(u.record, &u.sub, enrichment, 0).unwrap())
            .collect()
    }

    #[test]
    fn one_row_per_contract_and_entitlement() {
        let out = rows(&device());
        assert_eq!(out.len(), 3);

        let contract = out.first().unwrap();
        assert_eq!(contract.get(Field::ContractNumber), "4500012345");
        assert_eq!(contract.get(Field::ContractStartDate), "2024-01-01");
        assert_eq!(contract.get(Field::ContractExpirationDate), "2025-01-01");
        assert_eq!(contract.get(Field::ContractSupportType), "FortiCare Premium");
        assert_eq!(contract.get(Field::ContractStatus), "OPERATIONAL");
        assert_eq!(contract.get(Field::ContractArchived), "No");
        assert_eq!(contract.get(Field::EntitlementLevel), "");

        let expired = out.get(1).unwrap();
        assert_eq!(expired.get(Field::ContractNumber), "");
        assert_eq!(expired.get(Field::EntitlementType), "Hardware");
        assert_eq!(expired.get(Field::ContractStatus), "Expired");
        let active = out.get(2).unwrap();
        assert_eq!(active.get(Field::ContractStatus), "Active");
        assert_eq!(active.get(Field::EntitlementEndDate), "2026-12-31");
    }

    #[test]
    fn device_columns_repeat_on_every_row() {
        for row in rows(&device()) {
            assert_eq!(row.get(Field::SerialNumber), "FGT60F0000000001");
            assert_eq!(row.get(Field::Description), "branch-fw");
            assert_eq!(row.get(Field::ConnectionStatus), "");
            assert_eq!(row.get(Field::Status), "Registered");
            assert_eq!(row.get(Field::FolderId), "12");
            assert_eq!(row.get(Field::IsDecommissioned), "No");
            assert_eq!(row.get(Field::RegistrationDate), "2023-01-15");
            assert_eq!(row.get(Field::LastUpdated), "2023-01-15");
            assert_eq!(row.get(Field::ProductEos), "");
            assert_eq!(row.get(Field::AccountId), "1042");
            assert_eq!(row.get(Field::Company), "Acme");
            assert_eq!(row.get(Field::OrganizationalUnit), "EMEA");
            assert_eq!(row.get(Field::AccountEmail), "noc@acme.example");
            assert_eq!(row.get(Field::AccountOuId), "7");
            assert_eq!(row.get(Field::SourceSystem), "FortiCloud");
        }
    }

    #[test]
    fn uncovered_device_gets_sentinel_row() {
        let r = SourceRecord::from_value(json!({
            "serialNumber": "FGT40F0000000009",
            "status": "Pending",
            "contracts": [],
            "entitlements": []
        }))
        .unwrap();
        let out = rows(&r);
        assert_eq!(out.len(), 1);
        let row = out.first().unwrap();
        assert_eq!(row.get(Field::ContractStatus), NO_COVERAGE);
        assert_eq!(row.get(Field::EntitlementLevel), NO_COVERAGE);
        assert_eq!(row.get(Field::ContractArchived), "");
        assert_eq!(row.get(Field::Company), "");
    }
}
