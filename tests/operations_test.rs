//! End-to-end coverage of the five operations against in-memory links,
//! driven through the coordinator with a single-tenant override.

mod common;

use common::{enrichable_event, memory_links, sentinel_event, APPID};
use eventsweep::coordinator::{Coordinator, RunConfig};
use eventsweep::models::{event_collection, Tenant};
use eventsweep::operations::{OperationContext, OperationRegistry, RecordHandler};
use eventsweep::store::decode;
use serde_json::json;

fn single_tenant_run(operation: &str) -> RunConfig {
    RunConfig {
        operation: operation.to_string(),
        page_size: 1000,
        tenant_override: Some(Tenant::new(APPID, "7")),
    }
}

// --- removeDuplicates ------------------------------------------------------

/// The duplicate predicate is symmetric: whichever record of a duplicate
/// group is processed first sees at least one sibling and deletes itself.
/// There is no keep-first tie-break.
#[tokio::test]
async fn remove_duplicates_predicate_is_symmetric() {
    for first_processed in ["a", "b", "c"] {
        let (links, primary, _) = memory_links();
        let collection = event_collection(APPID);
        for id in ["a", "b", "c"] {
            primary.insert(&collection, sentinel_event(id, "open", 1_393_459_200, "u-9"));
        }

        let registry = OperationRegistry::standard();
        let spec = registry.lookup("removeDuplicates").unwrap();
        let tenant = Tenant::new(APPID, "7");
        let ctx = OperationContext {
            links: &links,
            tenant: &tenant,
        };

        let doc = primary
            .docs(&collection)
            .into_iter()
            .find(|doc| doc["_id"] == first_processed)
            .unwrap();
        let record = decode(&doc).unwrap();
        spec.handler.handle(&record, &ctx).await.unwrap();

        let remaining = primary.docs(&collection);
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|doc| doc["_id"] != first_processed));
    }
}

#[tokio::test]
async fn remove_duplicates_leaves_unique_records_alone() {
    let (links, primary, _) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, sentinel_event("a", "open", 100, "u-1"));
    primary.insert(&collection, sentinel_event("b", "open", 100, "u-2"));
    primary.insert(&collection, sentinel_event("c", "open", 200, "u-1"));

    let registry = OperationRegistry::standard();
    let summary = Coordinator::new(links, registry, single_tenant_run("removeDuplicates"))
        .run()
        .await
        .unwrap();

    // Distinct (timestamp, accountId) pairs: nothing qualifies as a
    // duplicate, nothing is deleted.
    assert_eq!(summary.visited, 3);
    assert_eq!(summary.deleted, 0);
    assert_eq!(primary.len(&collection), 3);
}

// --- updateOsType ----------------------------------------------------------

#[tokio::test]
async fn update_os_type_maps_known_platforms_and_skips_unknown() {
    let (links, primary, _) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, sentinel_event("pad", "open", 100, "u-1"));
    let mut odd = sentinel_event("odd", "open", 100, "u-2");
    odd["platform"] = json!("unknownvalue");
    primary.insert(&collection, odd);

    let summary = Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("updateOsType"),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.visited, 2);
    assert_eq!(summary.updated, 1);

    let docs = primary.docs(&collection);
    let pad = docs.iter().find(|doc| doc["_id"] == "pad").unwrap();
    assert_eq!(pad["osType"], "iOS");
    assert_eq!(pad["bundleId"], "com.dooland.padforiosfromweb.reader");

    // Unknown platform: zero writes, record untouched, not an error.
    let odd = docs.iter().find(|doc| doc["_id"] == "odd").unwrap();
    assert_eq!(odd["osType"], "windows");
    assert_eq!(odd["bundleId"], "");
}

#[tokio::test]
async fn update_os_type_rerun_is_a_noop() {
    let (links, primary, _) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, sentinel_event("pad", "open", 100, "u-1"));

    let registry = OperationRegistry::standard();
    let run = single_tenant_run("updateOsType");
    Coordinator::new(links.clone(), registry, run.clone())
        .run()
        .await
        .unwrap();

    // The corrected record no longer matches `osType == "windows"`.
    let summary = Coordinator::new(links, OperationRegistry::standard(), run)
        .run()
        .await
        .unwrap();
    assert_eq!(summary.visited, 0);
    assert_eq!(summary.updated, 0);
}

// --- updateEvent -----------------------------------------------------------

#[tokio::test]
async fn update_event_rewrites_info_prefixes_only() {
    let (links, primary, _) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, sentinel_event("a", "infoMag", 100, "u-1"));
    primary.insert(&collection, sentinel_event("b", "infoBook", 100, "u-2"));
    primary.insert(&collection, sentinel_event("c", "downloadMag", 100, "u-3"));

    let summary = Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("updateEvent"),
    )
    .run()
    .await
    .unwrap();

    // Only the two legacy names match the base filter.
    assert_eq!(summary.visited, 2);
    assert_eq!(summary.updated, 2);

    let docs = primary.docs(&collection);
    assert_eq!(docs[0]["event"], "downloadMag");
    assert_eq!(docs[1]["event"], "downloadBook");
    assert_eq!(docs[2]["event"], "downloadMag");
}

// --- insertBrandId ---------------------------------------------------------

#[tokio::test]
async fn insert_brand_id_enriches_from_primary_catalog() {
    let (links, primary, secondary) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, enrichable_event("a", "m-5"));
    secondary.insert("mag_list", json!({"id": "m-5", "sort_id": "7"}));

    let summary = Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("insertBrandId"),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.updated, 1);
    let docs = primary.docs(&collection);
    assert_eq!(docs[0]["content"]["bid"], "7");
}

#[tokio::test]
async fn insert_brand_id_falls_back_to_the_backup_catalog() {
    let (links, primary, secondary) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, enrichable_event("a", "m-9"));
    secondary.insert("mag_list_bak", json!({"id": "m-9", "sort_id": "12"}));

    Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("insertBrandId"),
    )
    .run()
    .await
    .unwrap();

    let docs = primary.docs(&collection);
    assert_eq!(docs[0]["content"]["bid"], "12");

    // The fallback was reached through a primary-catalog miss.
    let lookups: Vec<_> = secondary
        .calls()
        .iter()
        .map(|call| call.collection.clone())
        .collect();
    assert!(lookups.contains(&"mag_list".to_string()));
    assert!(lookups.contains(&"mag_list_bak".to_string()));
}

#[tokio::test]
async fn insert_brand_id_skips_zero_sort_ids_without_writing() {
    let (links, primary, secondary) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, enrichable_event("a", "m-5"));
    secondary.insert("mag_list", json!({"id": "m-5", "sort_id": "0"}));

    let summary = Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("insertBrandId"),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 1);
    let docs = primary.docs(&collection);
    assert!(docs[0]["content"].get("bid").is_none());
}

#[tokio::test]
async fn insert_brand_id_misses_are_recoverable_per_record() {
    let (links, primary, secondary) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, enrichable_event("gone", "m-404"));
    primary.insert(&collection, enrichable_event("kept", "m-5"));
    secondary.insert("mag_list", json!({"id": "m-5", "sort_id": "3"}));

    let summary = Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("insertBrandId"),
    )
    .run()
    .await
    .unwrap();

    // The miss is logged and skipped; the scan continues to the next
    // record and the run exits cleanly.
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.updated, 1);
    let docs = primary.docs(&collection);
    assert!(docs[0]["content"].get("bid").is_none());
    assert_eq!(docs[1]["content"]["bid"], "3");
}

#[tokio::test]
async fn insert_brand_id_ignores_records_without_a_content_id() {
    let (links, primary, _) = memory_links();
    let collection = event_collection(APPID);
    let mut doc = enrichable_event("a", "");
    doc["content"] = json!({"id": ""});
    primary.insert(&collection, doc);

    let summary = Coordinator::new(
        links,
        OperationRegistry::standard(),
        single_tenant_run("insertBrandId"),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.visited, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn insert_brand_id_rerun_is_a_noop() {
    let (links, primary, secondary) = memory_links();
    let collection = event_collection(APPID);
    primary.insert(&collection, enrichable_event("a", "m-5"));
    secondary.insert("mag_list", json!({"id": "m-5", "sort_id": "7"}));

    let run = single_tenant_run("insertBrandId");
    Coordinator::new(links.clone(), OperationRegistry::standard(), run.clone())
        .run()
        .await
        .unwrap();

    // The enriched record now carries `content.bid` and falls out of the
    // base filter entirely.
    let summary = Coordinator::new(links, OperationRegistry::standard(), run)
        .run()
        .await
        .unwrap();
    assert_eq!(summary.visited, 0);
    assert_eq!(summary.updated, 0);
}
