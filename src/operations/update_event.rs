//! Event renaming: legacy `info*` names become `download*`.

use async_trait::async_trait;
use tracing::info;

use crate::error::HandlerError;
use crate::models::EventRecord;
use crate::operations::{HandlerOutcome, OperationContext, RecordHandler, SENTINEL_UDID};
use crate::store::{FieldUpdate, Filter};

/// Event names the rename targets.
pub const RENAMEABLE_EVENTS: [&str; 2] = ["infoMag", "infoBook"];

/// Records eligible for the rename.
pub fn base_filter() -> Filter {
    Filter::new()
        .eq("udid", SENTINEL_UDID)
        .is_in("event", RENAMEABLE_EVENTS)
}

/// The renamed event for `event`, or `None` when the name does not carry
/// the legacy prefix (in which case the handler performs zero writes).
pub fn renamed_event(event: &str) -> Option<String> {
    event.strip_prefix("info").map(|suffix| format!("download{suffix}"))
}

pub struct UpdateEvent;

#[async_trait]
impl RecordHandler for UpdateEvent {
    fn name(&self) -> &'static str {
        "updateEvent"
    }

    async fn handle(
        &self,
        record: &EventRecord,
        ctx: &OperationContext<'_>,
    ) -> Result<HandlerOutcome, HandlerError> {
        let Some(event) = renamed_event(&record.event) else {
            return Ok(HandlerOutcome::Unchanged);
        };

        info!(id = %record.id, from = %record.event, to = %event, "updating event name");

        let by_id = Filter::new().eq("_id", record.id.as_str());
        let update = FieldUpdate::new().set("event", event);
        ctx.links
            .primary()
            .update(&ctx.event_collection(), &by_id, &update)
            .await?;

        Ok(HandlerOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_prefix_becomes_download() {
        assert_eq!(renamed_event("infoMag"), Some("downloadMag".to_string()));
        assert_eq!(renamed_event("infoBook"), Some("downloadBook".to_string()));
        assert_eq!(renamed_event("info"), Some("download".to_string()));
    }

    #[test]
    fn other_names_are_left_alone() {
        assert_eq!(renamed_event("downloadMag"), None);
        assert_eq!(renamed_event("open"), None);
        assert_eq!(renamed_event(""), None);
    }

    #[test]
    fn rename_is_idempotent() {
        // A renamed event no longer carries the prefix, so a second pass
        // performs zero writes.
        let renamed = renamed_event("infoMag").unwrap();
        assert_eq!(renamed_event(&renamed), None);
    }
}
