//! Row shapes read from the secondary relational store.

use serde::{Deserialize, Serialize};

/// Row shape of the content catalogs (`mag_list`, `mag_list_bak`). Only the
/// sort id matters to the enrichment operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub sort_id: String,
}

/// Row shape of the download join table (`user_down_mag`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadRow {
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub user_id: String,
    /// Local timestamp string, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub add_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_sort_id_survives_numeric_columns() {
        let entry: CatalogEntry =
            serde_json::from_value(json!({"id": 5, "sort_id": 12})).unwrap();
        assert_eq!(entry.id, "5");
        assert_eq!(entry.sort_id, "12");
    }

    #[test]
    fn download_row_defaults_missing_fields() {
        let row: DownloadRow = serde_json::from_value(json!({"user_id": "u-9"})).unwrap();
        assert_eq!(row.user_id, "u-9");
        assert_eq!(row.add_time, "");
    }
}
