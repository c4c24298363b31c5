// ── Source and device-type vocabulary ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The inventory system a batch of records was exported from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SourceSystem {
    /// Fleet manager (FortiManager JSON-RPC device database).
    #[strum(to_string = "FortiManager", serialize = "fmg")]
    FortiManager,
    /// Cloud registration and entitlement service.
    #[strum(to_string = "FortiCloud", serialize = "fc")]
    FortiCloud,
    /// IT asset management tool.
    #[strum(to_string = "TopDesk", serialize = "td")]
    TopDesk,
}

impl SourceSystem {
    /// Literal written to the `Source System` column.
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Short prefix used in export file names.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::FortiManager => "fmg",
            Self::FortiCloud => "fc",
            Self::TopDesk => "td",
        }
    }
}

/// Canonical device class. Firewalls are controllers; switches and access
/// points are dependents that may be enriched with their parent firewall.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum DeviceType {
    #[strum(to_string = "firewall", serialize = "fortigate")]
    Firewall,
    #[strum(to_string = "switch", serialize = "fortiswitch")]
    Switch,
    #[strum(to_string = "access-point", serialize = "fortiap", serialize = "ap")]
    AccessPoint,
}

impl DeviceType {
    /// Literal written to the `Asset Type` column.
    pub fn asset_type(self) -> &'static str {
        match self {
            Self::Firewall => "Firewall",
            Self::Switch => "Switch",
            Self::AccessPoint => "Access Point",
        }
    }

    /// Product family name used to build a model from a firmware code.
    pub fn family(self) -> &'static str {
        match self {
            Self::Firewall => "FortiGate",
            Self::Switch => "FortiSwitch",
            Self::AccessPoint => "FortiAP",
        }
    }

    /// Family slug used in export file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Firewall => "fortigate",
            Self::Switch => "fortiswitch",
            Self::AccessPoint => "fortiap",
        }
    }

    pub fn is_controller(self) -> bool {
        matches!(self, Self::Firewall)
    }

    pub fn is_dependent(self) -> bool {
        !self.is_controller()
    }
}
