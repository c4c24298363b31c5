// ── Value conversions ──
//
// Small, independently testable normalizers used by the field mappers:
// date and timestamp rendering, firmware version assembly, and the
// heuristics that infer a model or serial number from free text.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::model::DeviceType;

/// Canonical `Last Updated` timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Dates ──────────────────────────────────────────────────────────

/// Parse the date part of any supported date or datetime spelling.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Normalize a source date to `YYYY-MM-DD`.
///
/// Empty input and the `N/A` placeholder become empty. A value that cannot
/// be parsed is returned unchanged so the original stays auditable.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return String::new();
    }
    parse_date(trimmed).map_or_else(
        || raw.to_owned(),
        |date| date.format(DATE_FORMAT).to_string(),
    )
}

/// Render epoch seconds as a UTC timestamp. Zero and out-of-range values
/// render empty.
pub fn epoch_timestamp(secs: i64) -> String {
    if secs == 0 {
        return String::new();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|dt| format_timestamp(&dt))
        .unwrap_or_default()
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Coverage state of an entitlement ending on `end`, as of the run time.
pub fn coverage_state(end: &str, as_of: &DateTime<Utc>) -> &'static str {
    match parse_date(end) {
        Some(date) if date < as_of.date_naive() => "Expired",
        Some(_) => "Active",
        None => "Unknown",
    }
}

// ── Firmware ───────────────────────────────────────────────────────

/// Assemble `"{major}.{minor}.{patch}-build{build}"` from discrete parts.
/// Empty when the major version is absent or zero.
pub fn firmware_version(
    major: Option<i64>,
    minor: Option<i64>,
    patch: Option<i64>,
    build: Option<i64>,
) -> String {
    match major {
        Some(major) if major != 0 => format!(
            "{major}.{}.{}-build{}",
            minor.unwrap_or(0),
            patch.unwrap_or(0),
            build.unwrap_or(0)
        ),
        _ => String::new(),
    }
}

fn firmware_pattern(device_type: DeviceType) -> &'static Regex {
    static FIREWALL: OnceLock<Regex> = OnceLock::new();
    static SWITCH: OnceLock<Regex> = OnceLock::new();
    static ACCESS_POINT: OnceLock<Regex> = OnceLock::new();

    let (cell, prefix) = match device_type {
        DeviceType::Firewall => (&FIREWALL, "FGT|FWF|FG"),
        DeviceType::Switch => (&SWITCH, "FS|S"),
        DeviceType::AccessPoint => (&ACCESS_POINT, "FAP|FP"),
    };
    cell.get_or_init(|| {
        Regex::new(&format!(
            r"^(?:{prefix})([A-Z0-9]+)-v[0-9][0-9A-Za-z.]*-build[0-9]+"
        ))
        .expect("valid firmware regex")
    })
}

/// Extract the model code from a firmware image string shaped
/// `<PREFIX><CODE>-v<version>-build<build>`, e.g. `S224EN-v7.4.5-build880`
/// yields `224EN` for a switch. `None` when the string has another shape.
pub fn extract_model_code(firmware: &str, device_type: DeviceType) -> Option<&str> {
    firmware_pattern(device_type)
        .captures(firmware.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `"<Family>-<CODE>"` from a firmware string, or empty when no code can
/// be extracted. Never guesses beyond the pattern.
pub fn model_from_firmware(firmware: &str, device_type: DeviceType) -> String {
    extract_model_code(firmware, device_type)
        .map(|code| format!("{}-{code}", device_type.family()))
        .unwrap_or_default()
}

// ── Free-text heuristics ───────────────────────────────────────────

fn serial_pattern(device_type: DeviceType) -> &'static Regex {
    static FIREWALL: OnceLock<Regex> = OnceLock::new();
    static SWITCH: OnceLock<Regex> = OnceLock::new();
    static ACCESS_POINT: OnceLock<Regex> = OnceLock::new();

    let (cell, pattern) = match device_type {
        DeviceType::Firewall => (&FIREWALL, r"(?i)\b(FG[TVW]?[A-Z0-9]{6,})\b"),
        DeviceType::Switch => (&SWITCH, r"(?i)\b(S\d{3}[A-Z0-9]{6,}|FS[A-Z0-9]{6,})\b"),
        DeviceType::AccessPoint => (
            &ACCESS_POINT,
            r"(?i)\b(FP[A-Z0-9]{6,}|FAP[A-Z0-9]{6,}|F\d{3}[A-Z]{2}[A-Z0-9]{6,})\b",
        ),
    };
    cell.get_or_init(|| Regex::new(pattern).expect("valid serial regex"))
}

fn support_contract_pattern() -> &'static Regex {
    static SUP: OnceLock<Regex> = OnceLock::new();
    SUP.get_or_init(|| {
        Regex::new(r"(?i)SUP\.(?:[A-Z0-9]+\.)?([A-Z0-9]{8,})").expect("valid contract regex")
    })
}

/// Best-effort serial number found in free text such as a contract name
/// (`SUP.FGT70GTK25008471`) or an asset summary.
///
/// Tries the device family's serial shape first, then the `SUP.` contract
/// form. Adjacent alphanumeric runs can produce false positives.
pub fn extract_serial(text: &str, device_type: DeviceType) -> Option<String> {
    [serial_pattern(device_type), support_contract_pattern()]
        .into_iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_owned())
}

/// Product model named in an asset summary, e.g. `"Fortinet FortiGate 60F"`
/// yields `"FortiGate 60F"`. Empty when no product token is present.
pub fn model_from_summary(summary: &str, device_type: DeviceType) -> String {
    let tokens: Vec<&str> = summary.split_whitespace().collect();
    let is_product = |token: &str| {
        let lower = token.to_ascii_lowercase();
        match device_type {
            DeviceType::Firewall => lower.contains("fortigate") || lower.contains("fortiwifi"),
            DeviceType::Switch => lower.contains("fortiswitch") || lower.starts_with("fs-"),
            DeviceType::AccessPoint => lower.contains("fortiap") || lower.starts_with("fap"),
        }
    };

    tokens
        .iter()
        .position(|t| is_product(t))
        .map(|i| match tokens.get(i + 1) {
            Some(next) => format!("{} {next}", tokens.get(i).copied().unwrap_or_default()),
            None => tokens.get(i).copied().unwrap_or_default().to_owned(),
        })
        .unwrap_or_default()
}
