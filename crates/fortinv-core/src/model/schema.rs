// ── Canonical schema ──
//
// The 60 output columns in their fixed order. `CanonicalRecord` stores one
// value per column in a field-indexed array, so a row can never omit a key.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use strum::{EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// One canonical column. Declaration order is the header order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
)]
pub enum Field {
    // Identification
    #[strum(serialize = "Serial Number")]
    SerialNumber,
    #[strum(serialize = "Device Name")]
    DeviceName,
    #[strum(serialize = "Hostname")]
    Hostname,
    #[strum(serialize = "Model")]
    Model,
    #[strum(serialize = "Description")]
    Description,
    #[strum(serialize = "Asset Type")]
    AssetType,
    #[strum(serialize = "Source System")]
    SourceSystem,

    // Network & connection
    #[strum(serialize = "Management IP")]
    ManagementIp,
    #[strum(serialize = "Connection Status")]
    ConnectionStatus,
    #[strum(serialize = "Management Mode")]
    ManagementMode,
    #[strum(serialize = "Firmware Version")]
    FirmwareVersion,

    // Organization & location
    #[strum(serialize = "Company")]
    Company,
    #[strum(serialize = "Organizational Unit")]
    OrganizationalUnit,
    #[strum(serialize = "Branch")]
    Branch,
    #[strum(serialize = "Location")]
    Location,
    #[strum(serialize = "Folder Path")]
    FolderPath,
    #[strum(serialize = "Folder ID")]
    FolderId,
    #[strum(serialize = "Vendor")]
    Vendor,

    // Contract
    #[strum(serialize = "Contract Number")]
    ContractNumber,
    #[strum(serialize = "Contract SKU")]
    ContractSku,
    #[strum(serialize = "Contract Type")]
    ContractType,
    #[strum(serialize = "Contract Summary")]
    ContractSummary,
    #[strum(serialize = "Contract Start Date")]
    ContractStartDate,
    #[strum(serialize = "Contract Expiration Date")]
    ContractExpirationDate,
    #[strum(serialize = "Contract Status")]
    ContractStatus,
    #[strum(serialize = "Contract Support Type")]
    ContractSupportType,
    #[strum(serialize = "Contract Archived")]
    ContractArchived,

    // Entitlement
    #[strum(serialize = "Entitlement Level")]
    EntitlementLevel,
    #[strum(serialize = "Entitlement Type")]
    EntitlementType,
    #[strum(serialize = "Entitlement Start Date")]
    EntitlementStartDate,
    #[strum(serialize = "Entitlement End Date")]
    EntitlementEndDate,

    // Lifecycle
    #[strum(serialize = "Status")]
    Status,
    #[strum(serialize = "Is Decommissioned")]
    IsDecommissioned,
    #[strum(serialize = "Archived")]
    Archived,
    #[strum(serialize = "Registration Date")]
    RegistrationDate,
    #[strum(serialize = "Product EoR")]
    ProductEor,
    #[strum(serialize = "Product EoS")]
    ProductEos,
    #[strum(serialize = "Last Updated")]
    LastUpdated,

    // Account
    #[strum(serialize = "Account ID")]
    AccountId,
    #[strum(serialize = "Account Email")]
    AccountEmail,
    #[strum(serialize = "Account OU ID")]
    AccountOuId,

    // Controller (HA)
    #[strum(serialize = "HA Mode")]
    HaMode,
    #[strum(serialize = "HA Cluster Name")]
    HaClusterName,
    #[strum(serialize = "HA Role")]
    HaRole,
    #[strum(serialize = "HA Member Status")]
    HaMemberStatus,
    #[strum(serialize = "HA Priority")]
    HaPriority,
    #[strum(serialize = "Max VDOMs")]
    MaxVdoms,

    // Parent tracking
    #[strum(serialize = "Parent FortiGate")]
    ParentName,
    #[strum(serialize = "Parent FortiGate Serial")]
    ParentSerial,
    #[strum(serialize = "Parent FortiGate Platform")]
    ParentPlatform,
    #[strum(serialize = "Parent FortiGate IP")]
    ParentIp,

    // Switch
    #[strum(serialize = "Device Type")]
    DeviceType,
    #[strum(serialize = "Max PoE Budget")]
    MaxPoeBudget,
    #[strum(serialize = "Join Time")]
    JoinTime,

    // Access point
    #[strum(serialize = "Board MAC")]
    BoardMac,
    #[strum(serialize = "Admin Status")]
    AdminStatus,
    #[strum(serialize = "Client Count")]
    ClientCount,
    #[strum(serialize = "Mesh Uplink")]
    MeshUplink,
    #[strum(serialize = "WTP Mode")]
    WtpMode,
    #[strum(serialize = "VDOM")]
    Vdom,
}

/// Number of canonical columns.
pub const FIELD_COUNT: usize = Field::COUNT;

impl Field {
    /// Column header text.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Zero-based column position.
    #[allow(clippy::as_conversions)]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered header row shared by every export.
pub fn header() -> Vec<&'static str> {
    Field::iter().map(Field::name).collect()
}

// ── CanonicalRecord ─────────────────────────────────────────────────

/// One unified output row. Every column is always present; columns that
/// do not apply to a source/device-type pair hold an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    values: [String; FIELD_COUNT],
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|_| String::new()),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.values
            .get(field.index())
            .map_or("", String::as_str)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(field.index()) {
            *slot = value.into();
        }
    }

    pub fn serial(&self) -> &str {
        self.get(Field::SerialNumber)
    }

    /// Values in header order, ready for a delimited writer.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// `(field, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::iter().zip(self.values())
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn schema_has_sixty_columns() {
        assert_eq!(FIELD_COUNT, 60);
        assert_eq!(header().len(), 60);
    }

    #[test]
    fn header_order_is_fixed() {
        let h = header();
        assert_eq!(h.first().copied(), Some("Serial Number"));
        assert_eq!(h.get(7).copied(), Some("Management IP"));
        assert_eq!(h.get(47).copied(), Some("Parent FortiGate"));
        assert_eq!(h.last().copied(), Some("VDOM"));
    }

    #[test]
    fn field_round_trips_through_header_text() {
        for field in Field::iter() {
            assert_eq!(Field::from_str(field.name()).ok(), Some(field));
        }
    }

    #[test]
    fn new_record_is_all_empty() {
        let r = CanonicalRecord::new();
        assert_eq!(r.values().count(), FIELD_COUNT);
        assert!(r.values().all(str::is_empty));
    }

    #[test]
    fn serializes_every_key() {
        let mut r = CanonicalRecord::new();
        r.set(Field::SerialNumber, "FGT60F0000000001");
        let json = serde_json::to_value(&r).unwrap_or_default();
        let obj = json.as_object().cloned().unwrap_or_default();
        assert_eq!(obj.len(), FIELD_COUNT);
        assert_eq!(
            obj.get("Serial Number").and_then(|v| v.as_str()),
            Some("FGT60F0000000001")
        );
        assert_eq!(obj.get("VDOM").and_then(|v| v.as_str()), Some(""));
    }
}
