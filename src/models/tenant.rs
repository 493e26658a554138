//! Tenants and the collection naming convention.

use serde::{Deserialize, Serialize};

/// Per-tenant event collections are named by appending the tenant's appid to
/// this prefix. This function is the single owner of that convention; call
/// sites never concatenate the name themselves.
pub fn event_collection(appid: &str) -> String {
    format!("event{appid}")
}

/// One customer, owning its own event collection. Read-only within this
/// system; sourced from the registry table or a run override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub appid: String,
    pub lib_id: String,
}

impl Tenant {
    pub fn new(appid: impl Into<String>, lib_id: impl Into<String>) -> Self {
        Self {
            appid: appid.into(),
            lib_id: lib_id.into(),
        }
    }

    /// Name of this tenant's event collection.
    pub fn collection(&self) -> String {
        event_collection(&self.appid)
    }
}

/// Row shape of the tenant registry table (`libuser_detail`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub appid: String,
}

impl From<TenantRecord> for Tenant {
    fn from(record: TenantRecord) -> Self {
        Self {
            appid: record.appid,
            lib_id: record.id,
        }
    }
}
