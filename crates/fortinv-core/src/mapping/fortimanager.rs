// ── FortiManager mapping tables ──
//
// Firewalls come from the device database (`/dvmdb/device`, HA members
// under `ha_slave`). Switches and APs come from managed-device status
// results proxied through their firewall, named by `target`.

use super::{
    Extract::{
        self, AsOf, Code, Column, Const, Derive, Describe, Epoch, ModelOrFirmware, Parent,
        ParentAdom, Path, Text, TextOr, Truthy,
    },
    FieldRule, MapInput, MappingTable, member, member_or_rec, rec, unit,
};
use crate::codes::CodeTable;
use crate::convert::firmware_version;
use crate::expand::{ExpansionRule, SubContext};
use crate::model::{CanonicalRecord, DeviceType, Field, FieldAccess, SourceSystem};

const ADOM: &[&str] = &["extra info", "adom"];

const fn code(key: &'static str, table: CodeTable, default: Option<i64>) -> Extract {
    Code {
        key,
        table,
        default,
    }
}

fn firewall_hostname(input: &MapInput<'_>, row: &CanonicalRecord) -> String {
    let hostname = input.record.text("hostname");
    if hostname.is_empty() {
        row.get(Field::DeviceName).to_owned()
    } else {
        hostname
    }
}

fn firewall_firmware(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    let r = input.record;
    firmware_version(r.int("os_ver"), r.int("mr"), r.int("patch"), r.int("build"))
}

fn firewall_company(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    let company = input
        .record
        .path_text(&["meta fields", "Company/Organization"]);
    if company.is_empty() {
        input.record.path_text(ADOM)
    } else {
        company
    }
}

fn cluster_name(input: &MapInput<'_>, _: &CanonicalRecord) -> String {
    match input.sub {
        SubContext::HaMember { cluster_name, .. } => cluster_name.clone(),
        _ => String::new(),
    }
}

const PARENT: [FieldRule; 4] = [
    rec(Field::ParentName, Parent(Field::ParentName)),
    rec(Field::ParentSerial, Parent(Field::ParentSerial)),
    rec(Field::ParentPlatform, Parent(Field::ParentPlatform)),
    rec(Field::ParentIp, Parent(Field::ParentIp)),
];

pub(super) static FIREWALL: MappingTable = MappingTable {
    source: SourceSystem::FortiManager,
    device_type: DeviceType::Firewall,
    expansion: ExpansionRule::FORTIMANAGER_HA,
    rules: &[
        unit(Field::SerialNumber, Text(&["sn"])),
        member_or_rec(Field::DeviceName, Text(&["name"])),
        rec(Field::Hostname, Derive(firewall_hostname)),
        rec(Field::Model, Text(&["platform_str"])),
        rec(Field::Description, Describe(&["desc"])),
        rec(Field::ManagementIp, Text(&["ip"])),
        rec(
            Field::ConnectionStatus,
            code("conn_status", CodeTable::ConnectionStatus, Some(0)),
        ),
        rec(
            Field::ManagementMode,
            code("mgmt_mode", CodeTable::ManagementMode, Some(0)),
        ),
        rec(Field::FirmwareVersion, Derive(firewall_firmware)),
        rec(Field::Company, Derive(firewall_company)),
        rec(Field::OrganizationalUnit, Path(ADOM)),
        rec(Field::Status, Column(&[Field::ConnectionStatus])),
        rec(Field::IsDecommissioned, Const("No")),
        rec(Field::Archived, Const("No")),
        rec(Field::LastUpdated, Epoch("last_checked")),
        rec(Field::HaMode, code("ha_mode", CodeTable::HaMode, Some(0))),
        rec(Field::HaClusterName, Derive(cluster_name)),
        member(Field::HaRole, code("role", CodeTable::HaRole, None)),
        member(
            Field::HaMemberStatus,
            code("status", CodeTable::MemberStatus, Some(0)),
        ),
        member(Field::HaPriority, Truthy("prio")),
        rec(Field::MaxVdoms, Truthy("maxvdom")),
    ],
};

pub(super) static SWITCH: MappingTable = MappingTable {
    source: SourceSystem::FortiManager,
    device_type: DeviceType::Switch,
    expansion: ExpansionRule::Single,
    rules: &[
        rec(
            Field::SerialNumber,
            Text(&["switch_id", "switch-id", "serial"]),
        ),
        rec(Field::DeviceName, Text(&["name"])),
        rec(
            Field::Hostname,
            Column(&[Field::DeviceName, Field::SerialNumber]),
        ),
        rec(
            Field::Model,
            ModelOrFirmware {
                keys: &["platform"],
                firmware: "os_version",
            },
        ),
        rec(Field::Description, Describe(&["description"])),
        rec(Field::ManagementIp, Parent(Field::ParentIp)),
        rec(
            Field::ConnectionStatus,
            code("state", CodeTable::ConnectionStatus, Some(0)),
        ),
        rec(Field::FirmwareVersion, Text(&["os_version"])),
        rec(Field::Company, ParentAdom),
        rec(Field::OrganizationalUnit, ParentAdom),
        rec(Field::Status, Column(&[Field::ConnectionStatus])),
        rec(Field::IsDecommissioned, Const("No")),
        rec(Field::Archived, Const("No")),
        rec(Field::LastUpdated, AsOf),
        PARENT[0],
        PARENT[1],
        PARENT[2],
        PARENT[3],
        rec(Field::DeviceType, TextOr(&["type"], "physical")),
        rec(Field::MaxPoeBudget, Truthy("max_poe_budget")),
        rec(Field::JoinTime, Text(&["join_time"])),
        rec(Field::Vdom, TextOr(&["vdom"], "root")),
    ],
};

pub(super) static ACCESS_POINT: MappingTable = MappingTable {
    source: SourceSystem::FortiManager,
    device_type: DeviceType::AccessPoint,
    expansion: ExpansionRule::Single,
    rules: &[
        rec(Field::SerialNumber, Text(&["wtp_id", "serial"])),
        rec(Field::DeviceName, Text(&["wtp_name", "name"])),
        rec(
            Field::Hostname,
            Column(&[Field::DeviceName, Field::SerialNumber]),
        ),
        rec(
            Field::Model,
            ModelOrFirmware {
                keys: &["model"],
                firmware: "os_version",
            },
        ),
        rec(Field::Description, Describe(&["description"])),
        rec(Field::ManagementIp, Text(&["ip_address"])),
        rec(
            Field::ConnectionStatus,
            code("connection_state", CodeTable::ConnectionStatus, Some(0)),
        ),
        rec(Field::FirmwareVersion, Text(&["os_version", "firmware"])),
        rec(Field::Company, ParentAdom),
        rec(Field::OrganizationalUnit, ParentAdom),
        rec(Field::Location, Text(&["location"])),
        rec(Field::Status, Column(&[Field::ConnectionStatus])),
        rec(Field::IsDecommissioned, Const("No")),
        rec(Field::Archived, Const("No")),
        rec(Field::LastUpdated, AsOf),
        PARENT[0],
        PARENT[1],
        PARENT[2],
        PARENT[3],
        rec(Field::BoardMac, Text(&["board_mac"])),
        rec(Field::AdminStatus, Text(&["admin_status"])),
        rec(Field::ClientCount, Text(&["client_count"])),
        rec(Field::MeshUplink, Text(&["mesh_uplink"])),
        rec(Field::WtpMode, Text(&["wtp_mode"])),
        rec(Field::Vdom, TextOr(&["vdom"], "root")),
    ],
};
