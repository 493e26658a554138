//! Binary entry point: parse flags, load configuration, open the two
//! links, and hand the run to the coordinator. Exits non-zero on any fatal
//! error; tenants ended early by non-fatal interrupts still exit zero.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use eventsweep::config::ConfigManager;
use eventsweep::coordinator::{Coordinator, RunConfig};
use eventsweep::logging;
use eventsweep::models::Tenant;
use eventsweep::operations::{OperationRegistry, DEFAULT_OPERATION};
use eventsweep::store::postgres::open_links;

#[derive(Parser, Debug)]
#[command(
    name = "eventsweep",
    version,
    about = "Batch maintenance for legacy analytics event collections"
)]
struct Cli {
    /// Database configuration file
    #[arg(short = 'c', long = "config", default_value = "dbconfig.yml")]
    config: PathBuf,

    /// Operation to run (insertBrandId / removeDuplicates / updateEvent /
    /// updateOsType / checkEvent)
    #[arg(short = 't', long = "operation", default_value = DEFAULT_OPERATION)]
    operation: String,

    /// Restrict the run to a single tenant appid, skipping the registry
    #[arg(short = 'a', long)]
    appid: Option<String>,

    /// Registry id paired with --appid (needed by checkEvent)
    #[arg(long)]
    lib_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_structured_logging();
    let cli = Cli::parse();

    let manager = ConfigManager::load_from_path(&cli.config)?;
    let config = manager.config();

    let links = open_links(config).await?;

    let tenant_override = cli
        .appid
        .map(|appid| Tenant {
            appid,
            lib_id: cli.lib_id.unwrap_or_default(),
        })
        .or_else(|| config.tenant_override());

    let run = RunConfig {
        operation: cli.operation,
        page_size: config.run.page_size,
        tenant_override,
    };

    let coordinator = Coordinator::new(links, OperationRegistry::standard(), run);
    let summary = coordinator.run().await?;

    info!(
        operation = %summary.operation,
        tenants = summary.tenants,
        visited = summary.visited,
        updated = summary.updated,
        deleted = summary.deleted,
        skipped = summary.skipped,
        interrupted_scans = summary.interrupted_scans,
        "run finished"
    );
    Ok(())
}
