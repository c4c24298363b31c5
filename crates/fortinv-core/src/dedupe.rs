// ── Deduplication ──
//
// Overlapping upstream queries can return the same device more than once.
// First write wins: a later row is dropped when its serial and coverage
// columns match a row already kept. Rows without a serial are never merged.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{CanonicalRecord, Field};

/// Columns that tell coverage expansions of one device apart.
const COVERAGE_KEY: [Field; 10] = [
    Field::ContractNumber,
    Field::ContractSku,
    Field::ContractType,
    Field::ContractStatus,
    Field::ContractStartDate,
    Field::ContractExpirationDate,
    Field::EntitlementLevel,
    Field::EntitlementType,
    Field::EntitlementStartDate,
    Field::EntitlementEndDate,
];

/// Identity of a row for deduplication.
fn row_key(row: &CanonicalRecord) -> Option<Vec<&str>> {
    let serial = row.serial();
    if serial.is_empty() {
        return None;
    }
    let mut key = Vec::with_capacity(COVERAGE_KEY.len() + 1);
    key.push(serial);
    key.extend(COVERAGE_KEY.iter().map(|f| row.get(*f)));
    Some(key)
}

/// Drop repeated rows in place, keeping first occurrences in order.
/// Returns the number of rows removed.
pub fn dedupe(rows: &mut Vec<CanonicalRecord>) -> usize {
    let before = rows.len();
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        rows.iter()
            .map(|row| row_key(row).is_none_or(|key| seen.insert(key)))
            .collect()
    };
    let mut flags = keep.into_iter();
    rows.retain(|_| flags.next().unwrap_or(true));

    let removed = before - rows.len();
    if removed > 0 {
        debug!(removed, kept = rows.len(), "duplicate rows dropped");
    }
    removed
}
