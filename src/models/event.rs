//! Event record shape as stored in the per-tenant `event<appid>` collections.

use serde::{Deserialize, Serialize};

/// One category level of a content taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CateItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Three-level content taxonomy attached to enriched records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CateModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<CateItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<CateItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third: Option<CateItem>,
}

/// Content reference embedded in an event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cate: Option<CateModel>,
    /// Brand id written by the enrichment operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<String>,
}

/// Account reference embedded in an event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    #[serde(rename = "accountId", default, deserialize_with = "super::lenient_string")]
    pub account_id: String,
}

/// One user action, as stored. Read-mostly: this job only touches `osType`,
/// `bundleId`, `event`, and `content.bid`, or deletes the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Opaque document id.
    #[serde(rename = "_id", default, deserialize_with = "super::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentModel>,
    #[serde(default)]
    pub udid: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub os: String,
    #[serde(rename = "osType", default)]
    pub os_type: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "bundleId", default)]
    pub bundle_id: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub account: AccountRef,
}

impl EventRecord {
    /// The content id this record points at, empty when absent.
    pub fn content_id(&self) -> &str {
        self.content.as_ref().map_or("", |content| content.id.as_str())
    }
}
