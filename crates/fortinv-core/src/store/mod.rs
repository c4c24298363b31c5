// ── Run-scoped lookup indexes ──
//
// Built once per pipeline run from side batches and read-only afterwards.

mod accounts;
mod collection;
mod xref;

pub use accounts::{AccountContext, AccountDirectory};
pub use xref::{CrossReferenceIndex, PARENT_KEYS, ParentContext};
