//! Join-driven event renaming.
//!
//! Unlike the tenant-scanned operations, this one walks the download join
//! table on the secondary link. Each qualifying row names an account and a
//! local timestamp; the matching event record (if any) gets the `info*` ->
//! `download*` rename applied. A row whose timestamp does not parse, or
//! whose lookup misses, is skipped - never fatal.

use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::HandlerError;
use crate::models::{DownloadRow, EventRecord, Tenant};
use crate::operations::{update_event, HandlerOutcome, OperationContext, OperationSpec};
use crate::store::{decode, Filter};

/// Download join table on the secondary link.
pub const DOWNLOAD_TABLE: &str = "user_down_mag";

/// Format of the join table's `add_time` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Base of the per-row event lookup; the row's account and timestamp
/// clauses are appended onto a clone.
pub fn base_filter() -> Filter {
    update_event::base_filter()
}

/// Join rows belonging to one tenant.
pub fn download_filter(tenant: &Tenant) -> Filter {
    Filter::new().eq("lib_id", tenant.lib_id.as_str())
}

/// Parse a join-table timestamp into a unix timestamp (UTC).
pub fn parse_download_timestamp(raw: &str) -> Result<i64, HandlerError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|parsed| parsed.and_utc().timestamp())
        .map_err(|err| HandlerError::timestamp_parse(raw, err))
}

/// Process one qualifying join row: parse, look up the single matching
/// event record, and apply the rename. A lookup miss is a skip, not an
/// error; a parse failure surfaces as a recoverable per-record error.
pub async fn process_download_row(
    spec: &OperationSpec,
    row: &DownloadRow,
    ctx: &OperationContext<'_>,
) -> Result<HandlerOutcome, HandlerError> {
    let timestamp = parse_download_timestamp(&row.add_time)?;

    let lookup = spec
        .base_filter
        .clone()
        .eq("account.accountId", row.user_id.as_str())
        .eq("timestamp", timestamp);
    let Some(doc) = ctx
        .links
        .primary()
        .find_one(&ctx.event_collection(), &lookup)
        .await?
    else {
        warn!(
            appid = %ctx.tenant.appid,
            user_id = %row.user_id,
            timestamp,
            "no event record for download row, skipped"
        );
        return Ok(HandlerOutcome::Skipped);
    };

    let record: EventRecord = decode(&doc)?;
    spec.handler.handle(&record, ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_parse_as_utc_unix_seconds() {
        // 2014-02-27 00:00:00 UTC
        assert_eq!(
            parse_download_timestamp("2014-02-27 00:00:00").unwrap(),
            1_393_459_200
        );
    }

    #[test]
    fn malformed_timestamps_are_recoverable_per_record() {
        let err = parse_download_timestamp("27/02/2014").unwrap_err();
        assert!(matches!(err, HandlerError::TimestampParse { .. }));

        let err = parse_download_timestamp("").unwrap_err();
        assert!(matches!(err, HandlerError::TimestampParse { .. }));
    }

    #[test]
    fn download_filter_scopes_by_lib_id() {
        let tenant = Tenant::new("abc", "lib-31");
        let filter = download_filter(&tenant);
        assert!(filter.matches(&serde_json::json!({"lib_id": "lib-31"})));
        assert!(!filter.matches(&serde_json::json!({"lib_id": "lib-32"})));
    }
}
