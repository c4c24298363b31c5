// ── Unification pipeline ──
//
// One run per (source, device type): index → expand → map → dedupe.
// Stages only move forward. A record without identity is skipped and
// counted; only structural errors abort the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumIter};
use tracing::{debug, info, warn};

use crate::codes::CodeTables;
use crate::dedupe::dedupe;
use crate::error::CoreError;
use crate::expand::Unit;
use crate::mapping::{Enrichment, Mapper};
use crate::model::{CanonicalRecord, DeviceType, SourceRecord, SourceSystem};
use crate::store::{AccountDirectory, CrossReferenceIndex};

// ── Stage ────────────────────────────────────────────────────────

/// Pipeline stage. Declaration order is the only allowed direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    /// Records are being collected by the caller.
    Fetching,
    Indexing,
    Expanding,
    Mapping,
    Deduplicating,
    Complete,
}

/// Forward-only stage tracker for one run.
#[derive(Debug, Clone)]
pub struct StageTracker {
    stage: Stage,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            stage: Stage::Fetching,
        }
    }

    pub fn current(&self) -> Stage {
        self.stage
    }

    /// Move to a later stage. Stages may be skipped, never revisited.
    pub fn advance(&mut self, to: Stage) -> Result<(), CoreError> {
        if to <= self.stage {
            return Err(CoreError::StageOrder {
                from: self.stage,
                to,
            });
        }
        debug!(from = %self.stage, %to, "pipeline stage");
        self.stage = to;
        Ok(())
    }
}

// ── Input / output ───────────────────────────────────────────────

/// Fully materialized input for one run.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: SourceSystem,
    pub device_type: DeviceType,
    pub records: Vec<SourceRecord>,
    /// Controller records of the same source, for parent enrichment.
    pub controllers: Vec<SourceRecord>,
    /// Cloud account records, for account enrichment.
    pub accounts: Vec<SourceRecord>,
}

impl SourceBatch {
    pub fn new(source: SourceSystem, device_type: DeviceType, records: Vec<SourceRecord>) -> Self {
        Self {
            source,
            device_type,
            records,
            controllers: Vec::new(),
            accounts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_controllers(mut self, controllers: Vec<SourceRecord>) -> Self {
        self.controllers = controllers;
        self
    }

    #[must_use]
    pub fn with_accounts(mut self, accounts: Vec<SourceRecord>) -> Self {
        self.accounts = accounts;
        self
    }
}

/// A record left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position in the input batch.
    pub index: usize,
    pub reason: String,
}

/// Result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: SourceSystem,
    pub device_type: DeviceType,
    /// Canonical rows in input order.
    pub records: Vec<CanonicalRecord>,
    pub input_records: usize,
    /// Units produced by expansion, before mapping.
    pub expanded_rows: usize,
    pub skipped: Vec<SkippedRecord>,
    pub duplicates_removed: usize,
}

// ── Pipeline ─────────────────────────────────────────────────────

/// Run configuration shared by every batch of an export.
#[derive(Debug, Clone)]
pub struct Pipeline {
    tables: CodeTables,
    as_of: DateTime<Utc>,
    dedupe: bool,
}

impl Pipeline {
    /// Fortinet code tables, deduplication on.
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            tables: CodeTables::fortinet(),
            as_of,
            dedupe: true,
        }
    }

    #[must_use]
    pub fn with_tables(mut self, tables: CodeTables) -> Self {
        self.tables = tables;
        self
    }

    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn run(&self, batch: &SourceBatch) -> Result<RunReport, CoreError> {
        let (source, device_type) = (batch.source, batch.device_type);
        let mapper = Mapper::new(source, device_type, &self.tables, self.as_of);
        let mut stage = StageTracker::new();

        // Indexing
        let parents = if device_type.is_dependent() {
            stage.advance(Stage::Indexing)?;
            CrossReferenceIndex::build(source, &batch.controllers, &self.tables)
        } else {
            CrossReferenceIndex::empty()
        };
        let accounts = AccountDirectory::build(&batch.accounts);

        // Expanding
        stage.advance(Stage::Expanding)?;
        let expanded: Vec<Vec<Unit<'_>>> = batch
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| mapper.expansion().expand(record, index, &self.tables))
            .collect::<Result<_, _>>()?;
        let expanded_rows: usize = expanded.iter().map(Vec::len).sum();
        debug!(records = batch.records.len(), expanded_rows, "records expanded");

        // Mapping
        stage.advance(Stage::Mapping)?;
        let mut records = Vec::with_capacity(expanded_rows);
        let mut skipped = Vec::new();
        for (index, (record, units)) in batch.records.iter().zip(&expanded).enumerate() {
            let account = accounts.resolve(record);
            let parent = parents.resolve(record);
            if device_type.is_dependent() {
                if parent.is_empty() {
                    debug!(%source, %device_type, index, "parent controller not resolved");
                } else if !parent.is_connected() {
                    debug!(
                        index,
                        parent = %parent.name,
                        status = %parent.connection_status,
                        "parent controller is not connected"
                    );
                }
            }
            let enrichment = Enrichment {
                parent,
                account: &account,
            };
            // A record is mapped whole or skipped whole.
            let mapped: Result<Vec<_>, _> = units
                .iter()
                .map(|unit| mapper.map(unit.record, &unit.sub, enrichment, index))
                .collect();
            match mapped {
                Ok(rows) => records.extend(rows),
                Err(err) if err.is_record_level() => {
                    warn!(%source, %device_type, index, error = %err, "record skipped");
                    skipped.push(SkippedRecord {
                        index,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        // Deduplicating
        stage.advance(Stage::Deduplicating)?;
        let duplicates_removed = if self.dedupe {
            dedupe(&mut records)
        } else {
            0
        };

        stage.advance(Stage::Complete)?;
        info!(
            %source,
            %device_type,
            rows = records.len(),
            skipped = skipped.len(),
            duplicates_removed,
            "unification run complete"
        );

        Ok(RunReport {
            source,
            device_type,
            records,
            input_records: batch.records.len(),
            expanded_rows,
            skipped,
            duplicates_removed,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn stages_only_move_forward() {
        let mut t = StageTracker::new();
        t.advance(Stage::Expanding).unwrap();
        assert_eq!(t.current(), Stage::Expanding);
        let err = t.advance(Stage::Indexing).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StageOrder {
                from: Stage::Expanding,
                to: Stage::Indexing
            }
        ));
        assert!(t.advance(Stage::Expanding).is_err());
        t.advance(Stage::Complete).unwrap();
    }

    #[test]
    fn stage_order_matches_declaration() {
        let stages: Vec<_> = Stage::iter().collect();
        assert!(stages.windows(2).all(|w| w.first() < w.get(1)));
        assert_eq!(Stage::Deduplicating.to_string(), "deduplicating");
    }

    #[test]
    fn empty_batch_completes() {
        let batch = SourceBatch::new(SourceSystem::TopDesk, DeviceType::Switch, Vec::new());
        let report = Pipeline::new(Utc::now()).run(&batch).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.expanded_rows, 0);
        assert!(report.skipped.is_empty());
    }
}
