//! # Data Models
//!
//! The few document and row shapes this job reads. Everything else about the
//! business schema is opaque: records are mutated only through targeted
//! field updates or deletion, never created or rewritten wholesale.

pub mod catalog;
pub mod event;
pub mod tenant;

// Re-export core models for easy access
pub use catalog::{CatalogEntry, DownloadRow};
pub use event::{AccountRef, CateItem, CateModel, ContentModel, EventRecord};
pub use tenant::{event_collection, Tenant, TenantRecord};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the relational store may hand over as either a
/// string or a number (legacy columns are inconsistent about this) into a
/// `String`. Missing and null both become the empty string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::lenient_string", default)]
        id: String,
    }

    #[test]
    fn lenient_string_accepts_numbers_and_strings() {
        let from_string: Probe = serde_json::from_value(json!({"id": "42"})).unwrap();
        assert_eq!(from_string.id, "42");

        let from_number: Probe = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(from_number.id, "42");

        let from_null: Probe = serde_json::from_value(json!({"id": null})).unwrap();
        assert_eq!(from_null.id, "");
    }
}
