// ── Cross-reference index ──
//
// Controller identity lookup used to enrich dependent devices with their
// parent firewall. A miss resolves to an all-empty context.

use tracing::debug;

use super::collection::KeyedCollection;
use crate::codes::{CodeTable, CodeTables};
use crate::model::{Field, FieldAccess, SourceRecord, SourceSystem};

/// Parent-controller side data attached to a dependent record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentContext {
    pub name: String,
    pub serial: String,
    pub platform: String,
    pub ip: String,
    /// Administrative domain the controller lives in.
    pub adom: String,
    pub connection_status: String,
}

static NO_PARENT: ParentContext = ParentContext {
    name: String::new(),
    serial: String::new(),
    platform: String::new(),
    ip: String::new(),
    adom: String::new(),
    connection_status: String::new(),
};

impl ParentContext {
    /// The all-empty context a lookup miss resolves to.
    pub fn none() -> &'static Self {
        &NO_PARENT
    }

    pub fn is_empty(&self) -> bool {
        self == &NO_PARENT
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status == "Connected"
    }

    /// Value for one of the four parent-tracking columns.
    pub fn column(&self, field: Field) -> &str {
        match field {
            Field::ParentName => &self.name,
            Field::ParentSerial => &self.serial,
            Field::ParentPlatform => &self.platform,
            Field::ParentIp => &self.ip,
            _ => "",
        }
    }
}

/// Where a source keeps controller identity.
struct ControllerLayout {
    name: &'static [&'static str],
    serial: &'static [&'static str],
    platform: &'static [&'static str],
    ip: &'static [&'static str],
    adom: &'static [&'static str],
    status: &'static str,
}

impl ControllerLayout {
    fn for_source(source: SourceSystem) -> Self {
        match source {
            SourceSystem::FortiManager => Self {
                name: &["name"],
                serial: &["sn"],
                platform: &["platform_str"],
                ip: &["ip"],
                adom: &["extra info", "adom"],
                status: "conn_status",
            },
            SourceSystem::FortiCloud => Self {
                name: &["description"],
                serial: &["serialNumber"],
                platform: &["productModel"],
                ip: &[],
                adom: &["folderPath"],
                status: "status",
            },
            SourceSystem::TopDesk => Self {
                name: &["name"],
                serial: &["serienummer"],
                platform: &["model"],
                ip: &["ip-address"],
                adom: &[],
                status: "@status",
            },
        }
    }

    fn context(&self, record: &SourceRecord, tables: &CodeTables) -> ParentContext {
        ParentContext {
            name: record.first_text(self.name),
            serial: record.first_text(self.serial),
            platform: record.first_text(self.platform),
            ip: record.first_text(self.ip),
            adom: record.path_text(self.adom),
            connection_status: tables
                .translate_value(CodeTable::ConnectionStatus, record.field(self.status), Some(0))
                .to_owned(),
        }
    }
}

/// Keys a dependent record uses to name its parent controller.
pub const PARENT_KEYS: &[&str] = &["target", "parent"];

/// Controller lookup by name or serial, built once per pipeline run.
#[derive(Debug, Clone, Default)]
pub struct CrossReferenceIndex {
    parents: KeyedCollection<ParentContext>,
}

impl CrossReferenceIndex {
    /// An index that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index `controllers` from `source` by name and by serial.
    pub fn build(source: SourceSystem, controllers: &[SourceRecord], tables: &CodeTables) -> Self {
        let layout = ControllerLayout::for_source(source);
        let mut parents = KeyedCollection::new();
        for record in controllers {
            let ctx = layout.context(record, tables);
            let keys = [ctx.name.clone(), ctx.serial.clone()];
            if parents.insert(keys, ctx) == 0 {
                debug!(%source, "controller without a usable key left out of the index");
            }
        }
        debug!(%source, controllers = parents.len(), "cross-reference index built");
        Self { parents }
    }

    /// Exact-match lookup. A miss returns the empty context.
    pub fn lookup(&self, key: &str) -> &ParentContext {
        self.parents.get(key.trim()).unwrap_or(&NO_PARENT)
    }

    /// Resolve the parent named by a dependent record.
    pub fn resolve<R: FieldAccess + ?Sized>(&self, dependent: &R) -> &ParentContext {
        self.lookup(&dependent.first_text(PARENT_KEYS))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
