//! Brand-id enrichment from the content catalogs.
//!
//! The record's content id is looked up in the primary catalog on the
//! secondary link, falling back to the backup catalog on a miss. A hit
//! yields a sort id; empty or `"0"` sort ids are skipped with a distinct
//! warn, anything else is written into `content.bid` on the original
//! record. A miss from both catalogs is a recoverable per-record error.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::HandlerError;
use crate::models::{CatalogEntry, EventRecord};
use crate::operations::{HandlerOutcome, OperationContext, RecordHandler};
use crate::store::{decode, FieldUpdate, Filter};

/// Primary content catalog on the secondary link.
pub const PRIMARY_CATALOG: &str = "mag_list";

/// Backup catalog consulted when the primary misses.
pub const FALLBACK_CATALOG: &str = "mag_list_bak";

/// Event names whose records carry an enrichable content reference.
pub const ENRICHABLE_EVENTS: [&str; 2] = ["downloadMag", "infoMag"];

/// Records not yet enriched: no brand id, no category, matching event.
pub fn base_filter() -> Filter {
    Filter::new()
        .exists("content.bid", false)
        .exists("content.cate", false)
        .is_in("event", ENRICHABLE_EVENTS)
}

pub struct InsertBrandId;

impl InsertBrandId {
    /// Catalog lookup with fallback. A miss from both tables is the
    /// caller's recoverable per-record error.
    async fn lookup_catalog(
        &self,
        ctx: &OperationContext<'_>,
        content_id: &str,
    ) -> Result<CatalogEntry, HandlerError> {
        let by_id = Filter::new().eq("id", content_id);
        let secondary = ctx.links.secondary();

        let doc = match secondary.find_one(PRIMARY_CATALOG, &by_id).await? {
            Some(doc) => doc,
            None => match secondary.find_one(FALLBACK_CATALOG, &by_id).await? {
                Some(doc) => doc,
                None => return Err(HandlerError::catalog_miss(content_id)),
            },
        };
        Ok(decode(&doc)?)
    }
}

#[async_trait]
impl RecordHandler for InsertBrandId {
    fn name(&self) -> &'static str {
        "insertBrandId"
    }

    async fn handle(
        &self,
        record: &EventRecord,
        ctx: &OperationContext<'_>,
    ) -> Result<HandlerOutcome, HandlerError> {
        let content_id = record.content_id();
        if content_id.is_empty() {
            return Ok(HandlerOutcome::Unchanged);
        }

        let entry = self.lookup_catalog(ctx, content_id).await?;
        let brand_id = entry.sort_id;
        info!(id = %record.id, content_id, sort_id = %brand_id, "catalog hit");

        if brand_id.is_empty() || brand_id == "0" {
            warn!(id = %record.id, content_id, "empty brand id, skipped");
            return Ok(HandlerOutcome::Skipped);
        }

        let by_id = Filter::new().eq("_id", record.id.as_str());
        let update = FieldUpdate::new().set("content.bid", brand_id);
        ctx.links
            .primary()
            .update(&ctx.event_collection(), &by_id, &update)
            .await?;

        Ok(HandlerOutcome::Updated)
    }
}
