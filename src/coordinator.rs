//! # Concurrency Coordinator
//!
//! Fans a run out across tenants: one tokio task per tenant, spawned as the
//! enumerator yields it, unbounded by a pool. For the join-driven operation
//! the per-tenant task fans out again, one task per qualifying join row.
//! The run blocks on every spawned handle before returning - the async
//! equivalent of the original wait-group - and aggregates per-tenant stats
//! into a [`RunSummary`].
//!
//! Failure isolation: a scan interrupt (`NoMoreRows`, `Timeout`) ends one
//! tenant's scan and the run moves on; a record-level failure skips one
//! record; anything else aborts the whole run with a non-zero exit. One
//! tenant's failure never crashes a sibling's worker.

use tracing::{error, info, warn};

use crate::error::{Severity, StoreError, SweepError};
use crate::models::{DownloadRow, EventRecord, Tenant};
use crate::operations::{
    check_event, HandlerOutcome, OperationContext, OperationKind, OperationRegistry,
    OperationSpec,
};
use crate::scanner::Scan;
use crate::store::{decode, Document, Links};
use crate::tenants::TenantEnumerator;

/// Immutable configuration for one run, built from CLI flags and the
/// configuration file before the coordinator is constructed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Operation name, resolved against the registry.
    pub operation: String,
    /// Page size for every scan in the run.
    pub page_size: u32,
    /// When set, process exactly this tenant and skip the registry.
    pub tenant_override: Option<Tenant>,
}

/// Per-scan tallies, aggregated into the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub visited: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    /// The scan ended early on a non-fatal interrupt.
    pub interrupted: bool,
}

impl ScanStats {
    fn record(&mut self, outcome: HandlerOutcome) {
        match outcome {
            HandlerOutcome::Updated => self.updated += 1,
            HandlerOutcome::Deleted => self.deleted += 1,
            HandlerOutcome::Skipped => self.skipped += 1,
            HandlerOutcome::Unchanged => {}
        }
    }
}

/// Aggregate outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub operation: String,
    pub tenants: u64,
    pub visited: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub interrupted_scans: u64,
}

impl RunSummary {
    fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            ..Self::default()
        }
    }

    fn absorb(&mut self, stats: ScanStats) {
        self.tenants += 1;
        self.visited += stats.visited;
        self.updated += stats.updated;
        self.deleted += stats.deleted;
        self.skipped += stats.skipped;
        if stats.interrupted {
            self.interrupted_scans += 1;
        }
    }
}

/// Drives one maintenance run to completion.
pub struct Coordinator {
    links: Links,
    registry: OperationRegistry,
    config: RunConfig,
}

impl Coordinator {
    pub fn new(links: Links, registry: OperationRegistry, config: RunConfig) -> Self {
        Self {
            links,
            registry,
            config,
        }
    }

    /// Run the configured operation across all tenants. Returns the
    /// aggregated summary, or the first fatal error.
    pub async fn run(&self) -> Result<RunSummary, SweepError> {
        let spec = self
            .registry
            .lookup(&self.config.operation)
            .ok_or_else(|| SweepError::UnknownOperation {
                name: self.config.operation.clone(),
                known: self.registry.names(),
            })?;

        info!(
            operation = spec.name,
            page_size = self.config.page_size,
            single_tenant = self.config.tenant_override.is_some(),
            "starting maintenance run"
        );

        let mut tenants = match &self.config.tenant_override {
            Some(tenant) => TenantEnumerator::single(tenant.clone()),
            None => TenantEnumerator::registry(
                std::sync::Arc::clone(self.links.secondary()),
                self.config.page_size,
            ),
        };

        // Spawn as tenants arrive; every tenant gets its own task
        // immediately, unbounded by a pool.
        let mut handles = Vec::new();
        loop {
            let tenant = match tenants.try_next().await {
                Ok(Some(tenant)) => tenant,
                Ok(None) => break,
                Err(err) if err.is_scan_interrupt() => {
                    error!(error = %err, "tenant enumeration interrupted");
                    break;
                }
                Err(err) => return Err(SweepError::store_fatal("enumerate tenants", err)),
            };

            let links = self.links.clone();
            let spec = spec.clone();
            let page_size = self.config.page_size;
            handles.push(tokio::spawn(async move {
                run_tenant(links, spec, tenant, page_size).await
            }));
        }

        let mut summary = RunSummary::new(spec.name);
        for handle in handles {
            match handle.await {
                Ok(Ok(stats)) => summary.absorb(stats),
                Ok(Err(err)) => return Err(err),
                Err(join_err) => {
                    error!(error = %join_err, "tenant worker panicked");
                    return Err(SweepError::worker_panic(join_err.to_string()));
                }
            }
        }

        info!(
            operation = %summary.operation,
            tenants = summary.tenants,
            visited = summary.visited,
            updated = summary.updated,
            deleted = summary.deleted,
            skipped = summary.skipped,
            interrupted_scans = summary.interrupted_scans,
            "maintenance run complete"
        );
        Ok(summary)
    }
}

async fn run_tenant(
    links: Links,
    spec: OperationSpec,
    tenant: Tenant,
    page_size: u32,
) -> Result<ScanStats, SweepError> {
    if tenant.appid.is_empty() {
        warn!("tenant with empty appid, nothing to scan");
        return Ok(ScanStats::default());
    }

    match spec.kind {
        OperationKind::TenantScan => run_tenant_scan(&links, &spec, &tenant, page_size).await,
        OperationKind::JoinScan => run_join_scan(&links, &spec, &tenant, page_size).await,
    }
}

/// Walk one tenant's event collection and apply the handler per record.
async fn run_tenant_scan(
    links: &Links,
    spec: &OperationSpec,
    tenant: &Tenant,
    page_size: u32,
) -> Result<ScanStats, SweepError> {
    info!(appid = %tenant.appid, operation = spec.name, "scanning tenant");

    let collection = tenant.collection();
    let mut scan = Scan::new(
        std::sync::Arc::clone(links.primary()),
        collection,
        spec.base_filter.clone(),
        page_size,
    );
    let ctx = OperationContext { links, tenant };

    let mut stats = ScanStats::default();
    loop {
        let doc = match next_or_interrupt(&mut scan, &tenant.appid, &mut stats).await? {
            Some(doc) => doc,
            None => break,
        };
        let record: EventRecord =
            decode(&doc).map_err(|err| SweepError::store_fatal(spec.name, err))?;

        match spec.handler.handle(&record, &ctx).await {
            Ok(outcome) => stats.record(outcome),
            Err(err) => match Severity::classify(&err) {
                Severity::SkipRecord => {
                    warn!(id = %record.id, error = %err, "record skipped");
                    stats.skipped += 1;
                }
                Severity::StopScan => {
                    error!(appid = %tenant.appid, error = %err, "handler interrupted scan");
                    stats.interrupted = true;
                    break;
                }
                Severity::Fatal => return Err(SweepError::handler_fatal(spec.name, err)),
            },
        }
    }

    stats.visited = scan.visited();
    info!(
        appid = %tenant.appid,
        visited = stats.visited,
        updated = stats.updated,
        deleted = stats.deleted,
        skipped = stats.skipped,
        interrupted = stats.interrupted,
        "tenant scan complete"
    );
    Ok(stats)
}

/// Walk the download join table for one tenant, one spawned unit of work
/// per qualifying row.
async fn run_join_scan(
    links: &Links,
    spec: &OperationSpec,
    tenant: &Tenant,
    page_size: u32,
) -> Result<ScanStats, SweepError> {
    info!(appid = %tenant.appid, operation = spec.name, "scanning download rows");

    let mut scan = Scan::new(
        std::sync::Arc::clone(links.secondary()),
        check_event::DOWNLOAD_TABLE,
        check_event::download_filter(tenant),
        page_size,
    );

    let mut stats = ScanStats::default();
    let mut handles = Vec::new();
    loop {
        let doc = match next_or_interrupt(&mut scan, &tenant.appid, &mut stats).await? {
            Some(doc) => doc,
            None => break,
        };
        let row: DownloadRow =
            decode(&doc).map_err(|err| SweepError::store_fatal(spec.name, err))?;

        let links = links.clone();
        let spec = spec.clone();
        let tenant = tenant.clone();
        handles.push(tokio::spawn(async move {
            let ctx = OperationContext {
                links: &links,
                tenant: &tenant,
            };
            check_event::process_download_row(&spec, &row, &ctx).await
        }));
    }
    stats.visited = scan.visited();

    let results = futures::future::join_all(handles).await;
    for result in results {
        match result {
            Ok(Ok(outcome)) => stats.record(outcome),
            Ok(Err(err)) => match Severity::classify(&err) {
                Severity::SkipRecord | Severity::StopScan => {
                    warn!(appid = %tenant.appid, error = %err, "download row skipped");
                    stats.skipped += 1;
                }
                Severity::Fatal => return Err(SweepError::handler_fatal(spec.name, err)),
            },
            Err(join_err) => {
                error!(error = %join_err, "download row worker panicked");
                return Err(SweepError::worker_panic(join_err.to_string()));
            }
        }
    }

    info!(
        appid = %tenant.appid,
        visited = stats.visited,
        updated = stats.updated,
        skipped = stats.skipped,
        interrupted = stats.interrupted,
        "download scan complete"
    );
    Ok(stats)
}

/// Pull the next document, classifying scan interrupts as a clean early
/// stop for this tenant.
async fn next_or_interrupt(
    scan: &mut Scan,
    appid: &str,
    stats: &mut ScanStats,
) -> Result<Option<Document>, SweepError> {
    match scan.try_next().await {
        Ok(doc) => Ok(doc),
        Err(err) if err.is_scan_interrupt() => {
            error!(appid = %appid, error = %err, "scan interrupted, moving on");
            stats.interrupted = true;
            Ok(None)
        }
        Err(err) => Err(store_fatal_for(appid, err)),
    }
}

fn store_fatal_for(appid: &str, err: StoreError) -> SweepError {
    SweepError::store_fatal(format!("scan of tenant {appid}"), err)
}
