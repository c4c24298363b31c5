//! Device record unification engine for Fortinet inventory exports.
//!
//! Three inventory systems describe the same firewalls, switches and access
//! points in different shapes. This crate turns their already-parsed JSON
//! records into one canonical 60-column row format:
//!
//! - **[`Pipeline`]** — Runs one (source, device type) batch through
//!   indexing, expansion, mapping and deduplication. Records without any
//!   identity are skipped and reported in the [`RunReport`].
//!
//! - **[`ExpansionRule`]** — Fans a record out into HA members or
//!   contract/entitlement rows. Every record yields at least one row.
//!
//! - **[`Mapper`]** — Pure mapping driven by a declarative table per
//!   (source, device type) pair, with injected [`CodeTables`].
//!
//! - **[`CrossReferenceIndex`] / [`AccountDirectory`]** — Run-scoped lookups
//!   that enrich dependent devices with parent-controller data and cloud
//!   devices with account data. A miss is an empty context, never an error.
//!
//! - **Domain model** ([`model`]) — [`CanonicalRecord`], the ordered
//!   [`Field`] schema, and the read-only [`SourceRecord`] input.
//!
//! The engine performs no I/O. Fetching belongs to the caller, and writing
//! rows belongs to the serialization boundary (see the `fortinv` binary).

pub mod codes;
pub mod convert;
pub mod dedupe;
pub mod error;
pub mod expand;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use codes::{CodeTable, CodeTables};
pub use error::CoreError;
pub use expand::{ExpansionRule, SubContext, Unit};
pub use mapping::{Enrichment, Mapper, NO_COVERAGE, VENDOR};
pub use pipeline::{Pipeline, RunReport, SkippedRecord, SourceBatch, Stage, StageTracker};
pub use store::{AccountContext, AccountDirectory, CrossReferenceIndex, ParentContext};

pub use model::{
    CanonicalRecord, DeviceType, FIELD_COUNT, Field, FieldAccess, SourceRecord, SourceSystem,
    header,
};
