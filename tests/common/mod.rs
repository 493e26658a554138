//! Shared fixtures for the integration tests: in-memory links and
//! document builders shaped like the stored legacy data.
#![allow(dead_code)] // each test binary uses its own subset of fixtures

use std::sync::Arc;

use serde_json::{json, Value};

use eventsweep::operations::SENTINEL_UDID;
use eventsweep::store::{Links, MemoryStore};

/// The tenant used throughout the end-to-end scenarios.
pub const APPID: &str = "11244bf15870d8567b41d99b908544ed";

/// Both links backed by in-memory stores, with the concrete handles kept
/// for seeding and assertions.
pub fn memory_links() -> (Links, Arc<MemoryStore>, Arc<MemoryStore>) {
    let primary = Arc::new(MemoryStore::new());
    let secondary = Arc::new(MemoryStore::new());
    let links = Links::new(
        Arc::clone(&primary) as Arc<dyn eventsweep::store::Store>,
        Arc::clone(&secondary) as Arc<dyn eventsweep::store::Store>,
    );
    (links, primary, secondary)
}

/// A sentinel-marked event record document.
pub fn sentinel_event(id: &str, event: &str, timestamp: u64, account_id: &str) -> Value {
    json!({
        "_id": id,
        "event": event,
        "timestamp": timestamp,
        "udid": SENTINEL_UDID,
        "platform": "ipad",
        "os": "iOS 7.0",
        "osType": "windows",
        "version": "2.1",
        "bundleId": "",
        "ip": "203.0.113.9",
        "account": {"accountId": account_id}
    })
}

/// A record eligible for brand-id enrichment: carries a content id but no
/// `content.bid` and no `content.cate`.
pub fn enrichable_event(id: &str, content_id: &str) -> Value {
    json!({
        "_id": id,
        "event": "downloadMag",
        "timestamp": 1_393_459_200u64,
        "udid": SENTINEL_UDID,
        "content": {"id": content_id, "title": "weekly"},
        "account": {"accountId": "u-9"}
    })
}

/// A tenant registry row.
pub fn registry_row(id: &str, appid: &str) -> Value {
    json!({"id": id, "appid": appid})
}
