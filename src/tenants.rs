//! # Tenant Enumerator
//!
//! Yields the tenants a run processes: either exactly one override tenant
//! (registry access skipped entirely), or every row of the registry table
//! on the secondary link, paged with the same scanner the engine uses for
//! event collections.

use std::sync::Arc;

use crate::error::StoreError;
use crate::models::{Tenant, TenantRecord};
use crate::scanner::Scan;
use crate::store::{decode, Filter, Store};

/// Tenant registry table on the secondary link.
pub const TENANT_REGISTRY: &str = "libuser_detail";

enum Source {
    Single(Option<Tenant>),
    Registry(Scan),
}

/// Lazy sequence of tenants to process.
pub struct TenantEnumerator {
    source: Source,
}

impl TenantEnumerator {
    /// A sequence with exactly one element; the registry is never touched.
    pub fn single(tenant: Tenant) -> Self {
        Self {
            source: Source::Single(Some(tenant)),
        }
    }

    /// Page through the registry table on the secondary link.
    pub fn registry(store: Arc<dyn Store>, page_size: u32) -> Self {
        Self {
            source: Source::Registry(Scan::new(
                store,
                TENANT_REGISTRY,
                Filter::new(),
                page_size,
            )),
        }
    }

    /// Yield the next tenant, or `Ok(None)` when exhausted.
    pub async fn try_next(&mut self) -> Result<Option<Tenant>, StoreError> {
        match &mut self.source {
            Source::Single(slot) => Ok(slot.take()),
            Source::Registry(scan) => match scan.try_next().await? {
                None => Ok(None),
                Some(doc) => {
                    let record: TenantRecord = decode(&doc)?;
                    Ok(Some(record.into()))
                }
            },
        }
    }
}
