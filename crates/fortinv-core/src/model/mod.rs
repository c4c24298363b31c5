// ── Domain model ──

pub mod device;
pub mod record;
pub mod schema;

pub use device::{DeviceType, SourceSystem};
pub use record::{FieldAccess, SourceRecord, value_int, value_text, value_truthy};
pub use schema::{CanonicalRecord, FIELD_COUNT, Field, header};
