//! OS-type correction for records mislabelled as `windows`.
//!
//! The platform string a client reported determines the real
//! `{osType, bundleId}` pair through a fixed lookup table. Unknown platforms
//! are left untouched; they are not an error.

use async_trait::async_trait;
use tracing::info;

use crate::error::HandlerError;
use crate::models::EventRecord;
use crate::operations::{HandlerOutcome, OperationContext, RecordHandler, SENTINEL_UDID};
use crate::store::{FieldUpdate, Filter};

/// Records eligible for OS-type correction.
pub fn base_filter() -> Filter {
    Filter::new()
        .eq("udid", SENTINEL_UDID)
        .eq("osType", "windows")
}

/// The fixed platform table: reported platform -> `(osType, bundleId)`.
/// Returns `None` for platforms the table does not know.
pub fn platform_profile(platform: &str) -> Option<(&'static str, &'static str)> {
    match platform {
        "pc" | "pc_down" | "article" => Some(("Windows", "com.dooland.pc")),
        "ipad" => Some(("iOS", "com.dooland.padforiosfromweb.reader")),
        "iphone" => Some(("iOS", "com.dooland.mobileforiosfromweb.reader")),
        "android" => Some(("Android", "com.dooland.padforandroidfromweb.reader")),
        "androidmobile" => Some(("Android", "com.dooland.mobileforandroidfromweb.reader")),
        "waparticle" => Some(("Wap", "com.dooland.wapforweb.reader")),
        "dudubao" | "dudubao_down" => Some(("Dudubao", "com.dooland.dudubao")),
        _ => None,
    }
}

pub struct UpdateOsType;

#[async_trait]
impl RecordHandler for UpdateOsType {
    fn name(&self) -> &'static str {
        "updateOsType"
    }

    async fn handle(
        &self,
        record: &EventRecord,
        ctx: &OperationContext<'_>,
    ) -> Result<HandlerOutcome, HandlerError> {
        let Some((os_type, bundle_id)) = platform_profile(&record.platform) else {
            return Ok(HandlerOutcome::Unchanged);
        };

        info!(
            id = %record.id,
            platform = %record.platform,
            from_os_type = %record.os_type,
            to_os_type = os_type,
            from_bundle_id = %record.bundle_id,
            to_bundle_id = bundle_id,
            "updating os type"
        );

        let by_id = Filter::new().eq("_id", record.id.as_str());
        let update = FieldUpdate::new()
            .set("osType", os_type)
            .set("bundleId", bundle_id);
        ctx.links
            .primary()
            .update(&ctx.event_collection(), &by_id, &update)
            .await?;

        Ok(HandlerOutcome::Updated)
    }
}
