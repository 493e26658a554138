//! # In-Memory Store Adapter
//!
//! Test double for the [`Store`] contract: collections held in process,
//! filters evaluated with [`Filter::matches`], a call log for asserting the
//! pagination shape of a scan, and scriptable failures for the timeout and
//! no-more-rows paths.
//!
//! Lives in the library (not behind `cfg(test)`) so integration tests can
//! drive the whole engine against it.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::store::filter::{FieldUpdate, Filter};
use crate::store::{Document, Store};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub method: &'static str,
    pub collection: String,
    pub page: Option<u32>,
}

impl StoreCall {
    fn new(method: &'static str, collection: &str, page: Option<u32>) -> Self {
        Self {
            method,
            collection: collection.to_string(),
            page,
        }
    }
}

/// Failure kinds that can be injected into list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    NoMoreRows,
    Backend,
}

impl FailureKind {
    fn to_error(self) -> StoreError {
        match self {
            Self::Timeout => StoreError::Timeout,
            Self::NoMoreRows => StoreError::NoMoreRows,
            Self::Backend => StoreError::backend("injected backend failure"),
        }
    }
}

/// In-memory [`Store`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    calls: RwLock<Vec<StoreCall>>,
    list_failures: RwLock<HashMap<(String, u32), FailureKind>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one document into a collection, preserving insertion order.
    pub fn insert(&self, collection: &str, doc: Document) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    /// Insert a batch of documents into a collection.
    pub fn insert_all(&self, collection: &str, docs: impl IntoIterator<Item = Document>) {
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
    }

    /// Snapshot of a collection's documents.
    pub fn docs(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of documents currently in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// The calls recorded so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    /// Make the next list of `collection` page `page` fail with `kind`.
    /// Consumed on first hit.
    pub fn fail_list_on_page(&self, collection: &str, page: u32, kind: FailureKind) {
        self.list_failures
            .write()
            .insert((collection.to_string(), page), kind);
    }

    fn record(&self, method: &'static str, collection: &str, page: Option<u32>) {
        self.calls
            .write()
            .push(StoreCall::new(method, collection, page));
    }

    fn injected_failure(&self, collection: &str, page: u32) -> Option<StoreError> {
        self.list_failures
            .write()
            .remove(&(collection.to_string(), page))
            .map(FailureKind::to_error)
    }

    fn matching(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default()
    }

    fn page_slice(matched: Vec<Document>, page: u32, size: u32) -> Vec<Document> {
        let start = (page.saturating_sub(1) as usize).saturating_mul(size as usize);
        matched.into_iter().skip(start).take(size as usize).collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.record("count", collection, None);
        Ok(self.matching(collection, filter).len() as u64)
    }

    async fn list(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        size: u32,
    ) -> Result<Vec<Document>, StoreError> {
        self.record("list", collection, Some(page));
        if let Some(err) = self.injected_failure(collection, page) {
            return Err(err);
        }
        Ok(Self::page_slice(self.matching(collection, filter), page, size))
    }

    async fn list_counted(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        size: u32,
    ) -> Result<(Vec<Document>, u64), StoreError> {
        self.record("list_counted", collection, Some(page));
        if let Some(err) = self.injected_failure(collection, page) {
            return Err(err);
        }
        let matched = self.matching(collection, filter);
        let total = matched.len() as u64;
        Ok((Self::page_slice(matched, page, size), total))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.record("find_one", collection, None);
        Ok(self.matching(collection, filter).into_iter().next())
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &FieldUpdate,
    ) -> Result<u64, StoreError> {
        self.record("update", collection, None);
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut touched = 0;
        for doc in docs.iter_mut() {
            if filter.matches(doc) {
                update.apply(doc);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.record("delete", collection, None);
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_pages_preserve_insertion_order() {
        let store = MemoryStore::new();
        store.insert_all(
            "events",
            (0..5).map(|i| json!({"_id": format!("e{i}"), "udid": "x"})),
        );

        let filter = Filter::new().eq("udid", "x");
        let page1 = store.list("events", &filter, 1, 2).await.unwrap();
        let page3 = store.list("events", &filter, 3, 2).await.unwrap();

        assert_eq!(page1[0]["_id"], "e0");
        assert_eq!(page1[1]["_id"], "e1");
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0]["_id"], "e4");
    }

    #[tokio::test]
    async fn update_touches_only_matching_documents() {
        let store = MemoryStore::new();
        store.insert("events", json!({"_id": "a", "osType": "windows"}));
        store.insert("events", json!({"_id": "b", "osType": "iOS"}));

        let touched = store
            .update(
                "events",
                &Filter::new().eq("_id", "a"),
                &FieldUpdate::new().set("osType", "Windows").set("bundleId", "com.dooland.pc"),
            )
            .await
            .unwrap();

        assert_eq!(touched, 1);
        let docs = store.docs("events");
        assert_eq!(docs[0]["osType"], "Windows");
        assert_eq!(docs[0]["bundleId"], "com.dooland.pc");
        assert_eq!(docs[1]["osType"], "iOS");
    }

    #[tokio::test]
    async fn injected_failures_fire_once() {
        let store = MemoryStore::new();
        store.insert("events", json!({"_id": "a"}));
        store.fail_list_on_page("events", 1, FailureKind::Timeout);

        let err = store.list("events", &Filter::new(), 1, 10).await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout));

        // Consumed: the retry-free engine never sees it twice, but a fresh
        // call succeeds.
        let docs = store.list("events", &Filter::new(), 1, 10).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn call_log_records_method_collection_and_page() {
        let store = MemoryStore::new();
        store.insert("events", json!({"_id": "a"}));

        let _ = store.list_counted("events", &Filter::new(), 1, 10).await;
        let _ = store.delete("events", &Filter::new().eq("_id", "a")).await;

        let calls = store.calls();
        assert_eq!(calls[0], StoreCall::new("list_counted", "events", Some(1)));
        assert_eq!(calls[1], StoreCall::new("delete", "events", None));
    }
}
