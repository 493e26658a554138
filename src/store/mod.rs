//! # Store Adapter Contract
//!
//! Capability contract consumed by the batch engine: filtered counting,
//! paginated listing, single-document fetch, targeted field update, and
//! deletion, each against a named collection on one of two named
//! connections ("links").
//!
//! ## Links
//!
//! - `Link::Primary` (link 0) - the document store holding the per-tenant
//!   `event<appid>` collections.
//! - `Link::Secondary` (link 1) - the relational store holding the tenant
//!   registry, the download join table, and the content catalogs.
//!
//! ## Documents
//!
//! Rows cross the contract as JSON documents ([`Document`]); callers decode
//! them into typed models with [`decode`]. Filters are conjunctions of
//! immutable clauses over dotted field paths (see [`filter`]).
//!
//! The engine depends only on the [`Store`] trait. Production runs use the
//! PostgreSQL adapter ([`postgres::PgStore`]); tests use the in-memory
//! adapter ([`memory::MemoryStore`]).

pub mod filter;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::StoreError;

pub use filter::{Clause, FieldUpdate, Filter};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A row as it crosses the store contract.
pub type Document = serde_json::Value;

/// Decode a document into a typed model.
pub fn decode<T: DeserializeOwned>(doc: &Document) -> Result<T, StoreError> {
    serde_json::from_value(doc.clone()).map_err(|err| StoreError::serialization(err.to_string()))
}

/// Store capability contract.
///
/// `list` pages are 1-indexed. `list_counted` is the combined "list + count"
/// call used for the first page of a scan; the returned total is a snapshot
/// at that moment and implementations never refresh it on later pages.
#[async_trait]
pub trait Store: Send + Sync {
    /// Count records matching the filter.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Fetch one page of matching records.
    async fn list(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        size: u32,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch one page of matching records together with the total match
    /// count at this moment.
    async fn list_counted(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        size: u32,
    ) -> Result<(Vec<Document>, u64), StoreError>;

    /// Fetch a single matching record, if any.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Apply targeted field updates to every matching record. Returns the
    /// number of records touched.
    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &FieldUpdate,
    ) -> Result<u64, StoreError>;

    /// Delete every matching record. Returns the number of records removed.
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

/// Selector for one of the two store connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Link 0 - primary document store.
    Primary,
    /// Link 1 - secondary relational store.
    Secondary,
}

/// The two store connections shared by every worker in a run.
///
/// Cloning is cheap (two `Arc` bumps); the stores themselves are the sole
/// serialization points for concurrent access.
#[derive(Clone)]
pub struct Links {
    primary: Arc<dyn Store>,
    secondary: Arc<dyn Store>,
}

impl Links {
    pub fn new(primary: Arc<dyn Store>, secondary: Arc<dyn Store>) -> Self {
        Self { primary, secondary }
    }

    /// Resolve a link selector.
    pub fn link(&self, link: Link) -> &Arc<dyn Store> {
        match link {
            Link::Primary => &self.primary,
            Link::Secondary => &self.secondary,
        }
    }

    /// Link 0 - primary document store.
    pub fn primary(&self) -> &Arc<dyn Store> {
        &self.primary
    }

    /// Link 1 - secondary relational store.
    pub fn secondary(&self) -> &Arc<dyn Store> {
        &self.secondary
    }
}
