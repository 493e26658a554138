//! # Operation Registry & Record Handlers
//!
//! Every maintenance run executes exactly one named operation. An
//! [`OperationSpec`] pairs the operation's immutable base filter with its
//! per-record handler and its scan kind; [`OperationRegistry::standard`]
//! builds the full table once at startup, and the coordinator looks the
//! selected entry up by name.
//!
//! Handlers implement the operation's business logic against one record.
//! All mutating handlers issue targeted field updates or a delete by id,
//! and all are idempotent at the record level: re-running on an
//! already-fixed record is a no-op because the base filter no longer
//! matches it or the handler's own guard declines it.

pub mod check_event;
pub mod insert_brand_id;
pub mod remove_duplicates;
pub mod update_event;
pub mod update_os_type;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::models::{EventRecord, Tenant};
use crate::store::{Filter, Links};

pub use insert_brand_id::InsertBrandId;
pub use remove_duplicates::RemoveDuplicates;
pub use update_event::UpdateEvent;
pub use update_os_type::UpdateOsType;

/// Placeholder udid marking records eligible for the legacy-data
/// operations.
pub const SENTINEL_UDID: &str = "00old00analysis00";

/// Operation selected when the CLI flag is omitted.
pub const DEFAULT_OPERATION: &str = "insertBrandId";

/// How the coordinator drives an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Scan each tenant's event collection with the base filter.
    TenantScan,
    /// Scan the download join table and process one unit of work per
    /// qualifying row.
    JoinScan,
}

/// What a handler did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Targeted field update issued.
    Updated,
    /// Record deleted by id.
    Deleted,
    /// Guard condition declined the record; logged distinctly.
    Skipped,
    /// Nothing to do for this record.
    Unchanged,
}

/// Read-only context a handler works in.
pub struct OperationContext<'a> {
    pub links: &'a Links,
    pub tenant: &'a Tenant,
}

impl OperationContext<'_> {
    /// The tenant's event collection name.
    pub fn event_collection(&self) -> String {
        self.tenant.collection()
    }
}

/// Per-record business logic of one operation.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        record: &EventRecord,
        ctx: &OperationContext<'_>,
    ) -> Result<HandlerOutcome, HandlerError>;
}

/// One registry entry: name, scan kind, base filter, handler.
#[derive(Clone)]
pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OperationKind,
    /// Conjunction of immutable clauses defining which records the
    /// operation targets. Cloned into each scan; never mutated.
    pub base_filter: Filter,
    pub handler: Arc<dyn RecordHandler>,
}

/// Lookup table from operation name to spec, built once per run.
pub struct OperationRegistry {
    operations: HashMap<&'static str, OperationSpec>,
}

impl OperationRegistry {
    /// The standard table of the five maintenance operations.
    pub fn standard() -> Self {
        let mut operations = HashMap::new();

        let specs = [
            OperationSpec {
                name: "removeDuplicates",
                kind: OperationKind::TenantScan,
                base_filter: remove_duplicates::base_filter(),
                handler: Arc::new(RemoveDuplicates) as Arc<dyn RecordHandler>,
            },
            OperationSpec {
                name: "updateOsType",
                kind: OperationKind::TenantScan,
                base_filter: update_os_type::base_filter(),
                handler: Arc::new(UpdateOsType),
            },
            OperationSpec {
                name: "updateEvent",
                kind: OperationKind::TenantScan,
                base_filter: update_event::base_filter(),
                handler: Arc::new(UpdateEvent),
            },
            OperationSpec {
                name: "insertBrandId",
                kind: OperationKind::TenantScan,
                base_filter: insert_brand_id::base_filter(),
                handler: Arc::new(InsertBrandId),
            },
            OperationSpec {
                name: "checkEvent",
                kind: OperationKind::JoinScan,
                // The event lookup per join row starts from this base and
                // appends the row's account and timestamp clauses.
                base_filter: check_event::base_filter(),
                handler: Arc::new(UpdateEvent),
            },
        ];

        for spec in specs {
            operations.insert(spec.name, spec);
        }

        Self { operations }
    }

    /// Look an operation up by name.
    pub fn lookup(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.get(name)
    }

    /// Known operation names, sorted for stable error messages.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
