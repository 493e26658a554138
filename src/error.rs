//! # Error Taxonomy
//!
//! Structured error types for the maintenance engine using thiserror
//! for structured error types instead of `Box<dyn Error>` patterns.
//!
//! Three layers, mirroring how failures propagate through a run:
//!
//! - [`StoreError`] - what a store adapter can report. `NoMoreRows` and
//!   `Timeout` are scan interrupts; everything else is fatal.
//! - [`HandlerError`] - what a record handler can report, classified by
//!   [`Severity`] into skip-this-record, stop-this-scan, or abort-the-run.
//! - [`SweepError`] - the run-level error surfaced by the coordinator and
//!   mapped to a non-zero process exit by the binary.
//!
//! No retries exist anywhere in this taxonomy: a timeout or missing-row
//! condition means "this page/tenant is done", not "try again".

use thiserror::Error;

/// Errors reported by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has no (more) rows for the request.
    #[error("no more rows")]
    NoMoreRows,

    /// The store did not answer within its deadline.
    #[error("store operation timed out")]
    Timeout,

    /// Any other backend failure. Always fatal for the run.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// A row came back but could not be decoded into the expected shape.
    #[error("document decode error: {message}")]
    Serialization { message: String },
}

impl StoreError {
    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a document decode error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether this error ends the current scan without failing the run.
    pub fn is_scan_interrupt(&self) -> bool {
        matches!(self, Self::NoMoreRows | Self::Timeout)
    }
}

/// Errors reported by a record handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record's content id is missing from the primary catalog and the
    /// fallback catalog.
    #[error("content {content_id} missing from primary and fallback catalogs")]
    CatalogMiss { content_id: String },

    /// A join-table timestamp string did not parse.
    #[error("invalid download timestamp {raw:?}: {message}")]
    TimestampParse { raw: String, message: String },
}

impl HandlerError {
    /// Create a catalog miss error
    pub fn catalog_miss(content_id: impl Into<String>) -> Self {
        Self::CatalogMiss {
            content_id: content_id.into(),
        }
    }

    /// Create a timestamp parse error
    pub fn timestamp_parse(raw: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::TimestampParse {
            raw: raw.into(),
            message: message.to_string(),
        }
    }
}

/// How a handler failure affects the surrounding scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log and move to the next record on the page.
    SkipRecord,
    /// Log and stop scanning this tenant; sibling tenants continue.
    StopScan,
    /// Abort the whole run with a non-zero exit.
    Fatal,
}

impl Severity {
    /// Classify a handler failure.
    ///
    /// Classification never crashes a sibling tenant's worker; each worker
    /// applies it to its own failures in isolation.
    pub fn classify(error: &HandlerError) -> Self {
        match error {
            HandlerError::CatalogMiss { .. } | HandlerError::TimestampParse { .. } => {
                Self::SkipRecord
            }
            HandlerError::Store(store) if store.is_scan_interrupt() => Self::StopScan,
            HandlerError::Store(_) => Self::Fatal,
        }
    }
}

/// Run-level errors surfaced by the coordinator and the binary.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("connection error for {link}: {message}")]
    Connection { link: String, message: String },

    #[error("unknown operation {name:?}, expected one of {known:?}")]
    UnknownOperation {
        name: String,
        known: Vec<&'static str>,
    },

    #[error("store failure during {operation}: {source}")]
    StoreFatal {
        operation: String,
        #[source]
        source: StoreError,
    },

    #[error("handler failure during {operation}: {source}")]
    HandlerFatal {
        operation: String,
        #[source]
        source: HandlerError,
    },

    #[error("worker task failed: {message}")]
    WorkerPanic { message: String },
}

impl SweepError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(link: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            link: link.into(),
            message: message.into(),
        }
    }

    /// Create a fatal store error tagged with the operation that hit it
    pub fn store_fatal(operation: impl Into<String>, source: StoreError) -> Self {
        Self::StoreFatal {
            operation: operation.into(),
            source,
        }
    }

    /// Create a fatal handler error tagged with the operation that hit it
    pub fn handler_fatal(operation: impl Into<String>, source: HandlerError) -> Self {
        Self::HandlerFatal {
            operation: operation.into(),
            source,
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(message: impl Into<String>) -> Self {
        Self::WorkerPanic {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
