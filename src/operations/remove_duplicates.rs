//! Duplicate removal for legacy sentinel records.
//!
//! Two records are duplicates when they share a timestamp and an account id
//! but have different ids. The predicate is symmetric on purpose: each
//! duplicate independently deletes itself once it sees at least one
//! sibling, so a group of N exact duplicates ends with all N removed. There
//! is no keep-first tie-break.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::HandlerError;
use crate::models::EventRecord;
use crate::operations::{HandlerOutcome, OperationContext, RecordHandler, SENTINEL_UDID};
use crate::store::Filter;

/// Records eligible for deduplication.
pub fn base_filter() -> Filter {
    Filter::new().eq("udid", SENTINEL_UDID)
}

pub struct RemoveDuplicates;

#[async_trait]
impl RecordHandler for RemoveDuplicates {
    fn name(&self) -> &'static str {
        "removeDuplicates"
    }

    async fn handle(
        &self,
        record: &EventRecord,
        ctx: &OperationContext<'_>,
    ) -> Result<HandlerOutcome, HandlerError> {
        let collection = ctx.event_collection();

        let siblings = Filter::new()
            .ne("_id", record.id.as_str())
            .eq("timestamp", record.timestamp)
            .eq("account.accountId", record.account.account_id.as_str());
        let duplicates = ctx.links.primary().count(&collection, &siblings).await?;
        if duplicates == 0 {
            return Ok(HandlerOutcome::Unchanged);
        }

        info!(
            id = %record.id,
            duplicates,
            timestamp = record.timestamp,
            account_id = %record.account.account_id,
            "found duplicate(s), removing record"
        );
        let by_id = Filter::new().eq("_id", record.id.as_str());
        let removed = ctx.links.primary().delete(&collection, &by_id).await?;
        debug!(id = %record.id, removed, "remove success");

        Ok(HandlerOutcome::Deleted)
    }
}
