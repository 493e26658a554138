#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # eventsweep
//!
//! Batch maintenance engine for legacy analytics event collections spread
//! across two database backends.
//!
//! ## Overview
//!
//! One run executes one named operation: it enumerates tenants, walks each
//! tenant's event collection in fixed-size pages, and applies the
//! operation's per-record transformation - deduplication, field
//! correction, event renaming, or cross-store enrichment. Per-record and
//! per-scan failures are classified and isolated so a single bad record or
//! a timed-out tenant never aborts the whole run.
//!
//! ## Module Organization
//!
//! - [`store`] - store capability contract, filters, and the two adapters
//! - [`models`] - the few document and row shapes the job reads
//! - [`scanner`] - lazy paginated scan with a snapshot total
//! - [`operations`] - operation registry and the five record handlers
//! - [`tenants`] - tenant enumeration (registry scan or single override)
//! - [`coordinator`] - per-tenant fan-out and run summary
//! - [`config`] - file + environment configuration
//! - [`error`] - the failure taxonomy
//! - [`logging`] - tracing bootstrap
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eventsweep::coordinator::{Coordinator, RunConfig};
//! use eventsweep::operations::OperationRegistry;
//! use eventsweep::store::{Links, MemoryStore};
//!
//! # async fn example() -> Result<(), eventsweep::error::SweepError> {
//! let links = Links::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryStore::new()),
//! );
//! let run = RunConfig {
//!     operation: "insertBrandId".to_string(),
//!     page_size: 1000,
//!     tenant_override: None,
//! };
//! let coordinator = Coordinator::new(links, OperationRegistry::standard(), run);
//! let summary = coordinator.run().await?;
//! println!("visited {} records", summary.visited);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod models;
pub mod operations;
pub mod scanner;
pub mod store;
pub mod tenants;

pub use config::{ConfigManager, SweepConfig};
pub use coordinator::{Coordinator, RunConfig, RunSummary};
pub use error::{HandlerError, Result, Severity, StoreError, SweepError};
pub use operations::OperationRegistry;
pub use store::{Links, Store};
