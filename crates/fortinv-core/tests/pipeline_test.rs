#![allow(clippy::unwrap_used)]
// End-to-end tests for `Pipeline::run` over realistic export fixtures.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use fortinv_core::{
    CanonicalRecord, CoreError, DeviceType, FIELD_COUNT, Field, NO_COVERAGE, Pipeline, RunReport,
    SourceBatch, SourceRecord, SourceSystem, header,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn records(values: Vec<Value>) -> Vec<SourceRecord> {
    values
        .into_iter()
        .map(|v| SourceRecord::from_value(v).unwrap())
        .collect()
}

fn run(batch: &SourceBatch) -> RunReport {
    Pipeline::new(as_of()).run(batch).unwrap()
}

fn serials(rows: &[CanonicalRecord]) -> Vec<&str> {
    rows.iter().map(CanonicalRecord::serial).collect()
}

fn fmg_firewalls() -> Vec<SourceRecord> {
    records(vec![
        json!({
            "name": "branch-fw",
            "sn": "FGT60F0000000001",
            "platform_str": "FortiGate-60F",
            "ip": "10.0.0.1",
            "conn_status": 1,
            "os_ver": 7, "mr": 2, "patch": 1, "build": 318,
            "ha_mode": 0,
            "extra info": {"adom": "customers"}
        }),
        json!({
            "name": "dc-cluster",
            "sn": "FGT200F00000000A",
            "platform_str": "FortiGate-200F",
            "ip": "10.1.0.1",
            "conn_status": 1,
            "ha_mode": 2,
            "ha_group_name": "dc-ha",
            "ha_slave": [
                {"name": "dc-fw-a", "sn": "FGT200F00000000A", "role": 1, "status": 1, "prio": 200},
                {"name": "dc-fw-b", "sn": "FGT200F00000000B", "role": 0, "status": 1, "prio": 100}
            ]
        }),
    ])
}

fn fc_products() -> Vec<SourceRecord> {
    records(vec![
        json!({
            "serialNumber": "FGT40F0000000001",
            "description": "shop-fw",
            "productModel": "FortiGate 40F",
            "status": "Registered",
            "accountId": 77,
            "contracts": [
                {"contractNumber": "C-1", "sku": "FC-10-0040F", "terms": [{"startDate": "2024-01-01", "endDate": "2026-01-01", "supportType": "Premium"}]}
            ],
            "entitlements": [
                {"levelDesc": "Premium", "typeDesc": "Hardware", "startDate": "2024-01-01", "endDate": "2025-01-01"}
            ]
        }),
        json!({
            "serialNumber": "FGT40F0000000002",
            "description": "spare-fw",
            "productModel": "FortiGate 40F",
            "status": "Pending",
            "contracts": [],
            "entitlements": []
        }),
    ])
}

// ── Shape ───────────────────────────────────────────────────────────

#[test]
fn test_every_record_yields_at_least_one_row() {
    let batch = SourceBatch::new(SourceSystem::FortiCloud, DeviceType::Firewall, fc_products());
    let report = run(&batch);

    assert_eq!(report.input_records, 2);
    assert_eq!(report.expanded_rows, 3);
    assert_eq!(
        serials(&report.records),
        vec!["FGT40F0000000001", "FGT40F0000000001", "FGT40F0000000002"]
    );
    for serial in ["FGT40F0000000001", "FGT40F0000000002"] {
        assert!(report.records.iter().any(|r| r.serial() == serial));
    }
}

#[test]
fn test_rows_carry_every_canonical_key() {
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Firewall, fmg_firewalls());
    let report = run(&batch);

    assert_eq!(header().len(), FIELD_COUNT);
    for row in &report.records {
        let value = serde_json::to_value(row).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), FIELD_COUNT);
        let mut expected = header();
        expected.sort_unstable();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, expected);
        assert!(object.values().all(Value::is_string));
    }
}

#[test]
fn test_runs_are_idempotent() {
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Firewall, fmg_firewalls());
    let first = run(&batch);
    let second = run(&batch);
    assert_eq!(first.records, second.records);
}

// ── FortiManager ────────────────────────────────────────────────────

#[test]
fn test_firmware_version_is_composed() {
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Firewall, fmg_firewalls());
    let report = run(&batch);
    let standalone = report.records.first().unwrap();
    assert_eq!(standalone.get(Field::FirmwareVersion), "7.2.1-build318");
    assert_eq!(standalone.get(Field::HaMode), "Standalone");
}

#[test]
fn test_ha_cluster_yields_one_row_per_member() {
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Firewall, fmg_firewalls());
    let report = run(&batch);

    assert_eq!(report.records.len(), 3);
    let members: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.get(Field::HaClusterName) == "dc-ha")
        .collect();
    assert_eq!(members.len(), 2);

    let primary = members.first().unwrap();
    assert_eq!(primary.serial(), "FGT200F00000000A");
    assert_eq!(primary.get(Field::DeviceName), "dc-fw-a");
    assert_eq!(primary.get(Field::HaRole), "Primary");
    assert_eq!(primary.get(Field::HaPriority), "200");

    let secondary = members.get(1).unwrap();
    assert_eq!(secondary.serial(), "FGT200F00000000B");
    assert_eq!(secondary.get(Field::HaRole), "Secondary");
    assert_eq!(secondary.get(Field::HaMode), "Active-Passive");
    assert_eq!(secondary.get(Field::Model), "FortiGate-200F");
}

#[test]
fn test_ha_member_without_serial_is_kept() {
    let cluster = records(vec![json!({
        "name": "dc-cluster",
        "sn": "FGT200F00000000A",
        "ha_mode": 2,
        "ha_slave": [
            {"name": "dc-fw-a", "sn": "FGT200F00000000A", "role": 1},
            {"name": "dc-fw-b", "role": 0}
        ]
    })]);
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Firewall, cluster);
    let report = run(&batch);

    assert_eq!(report.duplicates_removed, 0);
    assert_eq!(serials(&report.records), vec!["FGT200F00000000A", ""]);
    let names: Vec<_> = report
        .records
        .iter()
        .map(|r| r.get(Field::DeviceName))
        .collect();
    assert_eq!(names, vec!["dc-fw-a", "dc-fw-b"]);
}

#[test]
fn test_switch_model_prefers_platform() {
    let switches = records(vec![json!({
        "switch_id": "S224ENTF00000001",
        "name": "floor1-sw",
        "os_version": "S224EN-v7.4.5-build880",
        "platform": "FS-224E",
        "state": "Authorized",
        "target": "branch-fw"
    })]);
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Switch, switches)
        .with_controllers(fmg_firewalls());
    let report = run(&batch);

    let row = report.records.first().unwrap();
    assert_eq!(row.get(Field::Model), "FS-224E");
    assert_eq!(row.get(Field::ParentName), "branch-fw");
    assert_eq!(row.get(Field::ParentSerial), "FGT60F0000000001");
    assert_eq!(row.get(Field::ParentIp), "10.0.0.1");
    assert_eq!(row.get(Field::ManagementIp), "10.0.0.1");
    assert_eq!(row.get(Field::Company), "customers");
}

#[test]
fn test_switch_model_falls_back_to_firmware() {
    let switches = records(vec![json!({
        "switch_id": "S224ENTF00000002",
        "os_version": "S224EN-v7.4.5-build880",
        "target": "branch-fw"
    })]);
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Switch, switches)
        .with_controllers(fmg_firewalls());
    let report = run(&batch);

    let row = report.records.first().unwrap();
    assert_eq!(row.get(Field::Model), "FortiSwitch-224EN");
    assert_eq!(row.get(Field::Description), "FortiSwitch-224EN Switch");
}

#[test]
fn test_unresolved_parent_leaves_parent_columns_empty() {
    let aps = records(vec![json!({
        "wtp_id": "FP231FTF23012345",
        "wtp_name": "lobby-ap",
        "os_version": "FP231F-v7.2.3-build0402",
        "target": "no-such-firewall"
    })]);
    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::AccessPoint, aps)
        .with_controllers(fmg_firewalls());
    let report = run(&batch);

    assert_eq!(report.records.len(), 1);
    assert!(report.skipped.is_empty());
    let row = report.records.first().unwrap();
    assert_eq!(row.get(Field::Model), "FortiAP-231F");
    for field in [
        Field::ParentName,
        Field::ParentSerial,
        Field::ParentPlatform,
        Field::ParentIp,
    ] {
        assert_eq!(row.get(field), "", "{field} should be empty");
    }
}

// ── FortiCloud / TopDesk ────────────────────────────────────────────

#[test]
fn test_uncovered_device_gets_no_coverage_row() {
    let batch = SourceBatch::new(SourceSystem::FortiCloud, DeviceType::Firewall, fc_products());
    let report = run(&batch);

    let spare = report.records.last().unwrap();
    assert_eq!(spare.serial(), "FGT40F0000000002");
    assert_eq!(spare.get(Field::ContractStatus), NO_COVERAGE);
    assert_eq!(spare.get(Field::ContractNumber), "");
}

#[test]
fn test_accounts_enrich_cloud_devices() {
    let accounts = records(vec![json!({"id": 77, "company": "Corner Shop", "email": "it@shop.example"})]);
    let batch = SourceBatch::new(SourceSystem::FortiCloud, DeviceType::Firewall, fc_products())
        .with_accounts(accounts);
    let report = run(&batch);

    let covered = report.records.first().unwrap();
    assert_eq!(covered.get(Field::Company), "Corner Shop");
    assert_eq!(covered.get(Field::AccountEmail), "it@shop.example");
    let spare = report.records.last().unwrap();
    assert_eq!(spare.get(Field::Company), "");
}

#[test]
fn test_topdesk_serial_recovered_from_contract_name() {
    let assets = records(vec![json!({
        "name": "AMS-SW01",
        "@@summary": "Fortinet FortiSwitch 148F",
        "serienummer": "N/A",
        "contracts": [{"name": "SUP.S148FFTF23001234", "status": "Active"}]
    })]);
    let batch = SourceBatch::new(SourceSystem::TopDesk, DeviceType::Switch, assets);
    let report = run(&batch);

    let row = report.records.first().unwrap();
    assert_eq!(row.serial(), "S148FFTF23001234");
    assert_eq!(row.get(Field::Model), "FortiSwitch 148F");
    assert_eq!(row.get(Field::SourceSystem), "TopDesk");
}

#[test]
fn test_topdesk_switch_resolves_topdesk_controller() {
    let firewalls = records(vec![json!({
        "name": "AMS-FW01",
        "serienummer": "FGT100F00000001",
        "model": "FortiGate 100F",
        "ip-address": "192.168.10.1",
        "@status": "Online"
    })]);
    let switches = records(vec![json!({
        "name": "AMS-SW02",
        "serienummer": "S148FFTF23005678",
        "target": "AMS-FW01"
    })]);
    let batch = SourceBatch::new(SourceSystem::TopDesk, DeviceType::Switch, switches)
        .with_controllers(firewalls);
    let report = run(&batch);

    let row = report.records.first().unwrap();
    assert_eq!(row.get(Field::ParentName), "AMS-FW01");
    assert_eq!(row.get(Field::ParentSerial), "FGT100F00000001");
    assert_eq!(row.get(Field::ParentPlatform), "FortiGate 100F");
    assert_eq!(row.get(Field::ParentIp), "192.168.10.1");
}

// ── Failure handling ────────────────────────────────────────────────

#[test]
fn test_records_without_identity_are_skipped_and_counted() {
    let assets = records(vec![
        json!({"name": "", "@@summary": "unlabelled box"}),
        json!({"name": "AMS-AP01", "serienummer": "FP231FTF23000001"}),
        json!({"@status": "Offline", "contracts": [{"name": "no serial here"}]}),
    ]);
    let batch = SourceBatch::new(SourceSystem::TopDesk, DeviceType::AccessPoint, assets);
    let report = run(&batch);

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.skipped.len(), 2);
    let indices: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn test_malformed_expansion_list_aborts_the_run() {
    let products = records(vec![json!({"serialNumber": "FGT40F0000000003", "contracts": "none"})]);
    let batch = SourceBatch::new(SourceSystem::FortiCloud, DeviceType::Firewall, products);
    let err = Pipeline::new(as_of()).run(&batch).unwrap_err();
    assert!(
        matches!(err, CoreError::MalformedExpansion { key: "contracts", index: 0, .. }),
        "expected MalformedExpansion, got: {err:?}"
    );
}

// ── Deduplication ───────────────────────────────────────────────────

#[test]
fn test_duplicate_devices_collapse_to_first_occurrence() {
    let mut firewalls = fmg_firewalls();
    let mut renamed = fmg_firewalls().into_iter().next().unwrap().into_inner();
    renamed.insert("name".into(), json!("branch-fw-renamed"));
    firewalls.push(SourceRecord::new(renamed));

    let batch = SourceBatch::new(SourceSystem::FortiManager, DeviceType::Firewall, firewalls);
    let report = run(&batch);
    assert_eq!(report.duplicates_removed, 1);
    let branch: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.serial() == "FGT60F0000000001")
        .collect();
    assert_eq!(branch.len(), 1);
    assert_eq!(branch.first().unwrap().get(Field::DeviceName), "branch-fw");

    let kept = Pipeline::new(as_of()).with_dedupe(false).run(&batch).unwrap();
    assert_eq!(kept.duplicates_removed, 0);
    assert_eq!(kept.records.len(), report.records.len() + 1);
}
