//! # PostgreSQL Store Adapter
//!
//! One adapter serves both links, in two rendering modes:
//!
//! - **Document mode** (link 0): every collection is a table of shape
//!   `(id bigserial primary key, doc jsonb not null)`. Filter paths render
//!   as `doc #> '{a,b}'` jsonb comparisons and updates render as chained
//!   `jsonb_set` calls, so writes stay targeted field updates.
//! - **Relational mode** (link 1): plain tables; rows are projected through
//!   `to_jsonb(t.*)` so both modes hand the engine the same document shape,
//!   and filter paths render as quoted column identifiers.
//!
//! Statements are rendered to SQL strings with inline, quote-escaped values
//! and logged at `debug!` before execution. Rendering is pure and covered by
//! string-level tests; execution is a thin sqlx layer that maps driver
//! errors into the engine's taxonomy (`RowNotFound` -> `NoMoreRows`,
//! I/O and pool timeouts -> `Timeout`, everything else -> `Backend`).

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::debug;

use crate::config::{LinkConfig, SweepConfig};
use crate::error::{StoreError, SweepError};
use crate::store::filter::{Clause, FieldUpdate, Filter};
use crate::store::{Document, Links, Store};
use std::sync::Arc;

/// How collection names and field paths map onto tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// `(id bigserial, doc jsonb)` tables; paths address into `doc`.
    Document,
    /// Plain relational tables; paths address columns.
    Relational,
}

/// Store adapter over a PostgreSQL pool.
pub struct PgStore {
    pool: PgPool,
    mode: TableMode,
}

impl PgStore {
    /// Adapter for the primary document link.
    pub fn document(pool: PgPool) -> Self {
        Self {
            pool,
            mode: TableMode::Document,
        }
    }

    /// Adapter for the secondary relational link.
    pub fn relational(pool: PgPool) -> Self {
        Self {
            pool,
            mode: TableMode::Relational,
        }
    }

    async fn fetch_docs(&self, sql: &str) -> Result<Vec<Document>, StoreError> {
        debug!(sql = %sql, "store query");
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.into_iter()
            .map(|row| {
                row.try_get::<Value, _>(0)
                    .map_err(|err| StoreError::serialization(err.to_string()))
            })
            .collect()
    }

    async fn execute(&self, sql: &str) -> Result<u64, StoreError> {
        debug!(sql = %sql, "store statement");
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|done| done.rows_affected())
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let sql = render_count(self.mode, collection, filter);
        debug!(sql = %sql, "store query");
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let total: i64 = row
            .try_get(0)
            .map_err(|err| StoreError::serialization(err.to_string()))?;
        Ok(total.max(0) as u64)
    }

    async fn list(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        size: u32,
    ) -> Result<Vec<Document>, StoreError> {
        let sql = render_select(self.mode, collection, filter, page, size);
        self.fetch_docs(&sql).await
    }

    async fn list_counted(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        size: u32,
    ) -> Result<(Vec<Document>, u64), StoreError> {
        let total = self.count(collection, filter).await?;
        let items = self.list(collection, filter, page, size).await?;
        Ok((items, total))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let sql = render_select(self.mode, collection, filter, 1, 1);
        let mut items = self.fetch_docs(&sql).await?;
        Ok(if items.is_empty() {
            None
        } else {
            Some(items.swap_remove(0))
        })
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &FieldUpdate,
    ) -> Result<u64, StoreError> {
        if update.is_empty() {
            return Ok(0);
        }
        let sql = render_update(self.mode, collection, filter, update);
        self.execute(&sql).await
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let sql = render_delete(self.mode, collection, filter);
        self.execute(&sql).await
    }
}

/// Open both pools from the loaded configuration and wrap them as [`Links`].
pub async fn open_links(config: &SweepConfig) -> Result<Links, SweepError> {
    let primary = open_pool(&config.primary)
        .await
        .map_err(|err| SweepError::connection("primary", err.to_string()))?;
    let secondary = open_pool(&config.secondary)
        .await
        .map_err(|err| SweepError::connection("secondary", err.to_string()))?;

    Ok(Links::new(
        Arc::new(PgStore::document(primary)),
        Arc::new(PgStore::relational(secondary)),
    ))
}

async fn open_pool(link: &LinkConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(link.pool)
        .acquire_timeout(Duration::from_secs(link.connect_timeout_seconds))
        .connect(&link.url)
        .await
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NoMoreRows,
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => StoreError::Timeout,
        other => StoreError::backend(other.to_string()),
    }
}

// --- SQL rendering ---------------------------------------------------------

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `content.bid` -> `'{content,bid}'` for jsonb path operators.
fn jsonb_path(path: &str) -> String {
    format!("'{{{}}}'", path.split('.').collect::<Vec<_>>().join(","))
}

fn render_field(mode: TableMode, path: &str) -> String {
    match mode {
        TableMode::Document => format!("doc #> {}", jsonb_path(path)),
        TableMode::Relational => quote_ident(path),
    }
}

fn render_value(mode: TableMode, value: &Value) -> String {
    match mode {
        TableMode::Document => format_json_value(value),
        TableMode::Relational => format_value(value),
    }
}

fn render_clause(mode: TableMode, path: &str, clause: &Clause) -> String {
    let field = render_field(mode, path);
    match clause {
        Clause::Eq(value) => format!("{} = {}", field, render_value(mode, value)),
        // IS DISTINCT FROM treats a missing (NULL) field as "different",
        // matching the filter contract for `!=`.
        Clause::Ne(value) => format!("{} IS DISTINCT FROM {}", field, render_value(mode, value)),
        Clause::In(values) => {
            let value_list = values
                .iter()
                .map(|value| render_value(mode, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{field} IN ({value_list})")
        }
        Clause::Exists(true) => format!("{field} IS NOT NULL"),
        Clause::Exists(false) => format!("{field} IS NULL"),
    }
}

fn render_where(mode: TableMode, filter: &Filter) -> String {
    if filter.is_empty() {
        return String::new();
    }
    let conditions = filter
        .clauses()
        .iter()
        .map(|(path, clause)| render_clause(mode, path, clause))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(" WHERE {conditions}")
}

fn render_select(mode: TableMode, collection: &str, filter: &Filter, page: u32, size: u32) -> String {
    let offset = u64::from(page.saturating_sub(1)) * u64::from(size);
    match mode {
        TableMode::Document => format!(
            "SELECT doc FROM {}{} ORDER BY id LIMIT {} OFFSET {}",
            quote_ident(collection),
            render_where(mode, filter),
            size,
            offset
        ),
        TableMode::Relational => format!(
            "SELECT to_jsonb(t.*) FROM {} AS t{} ORDER BY t.id LIMIT {} OFFSET {}",
            quote_ident(collection),
            render_where(mode, filter),
            size,
            offset
        ),
    }
}

fn render_count(mode: TableMode, collection: &str, filter: &Filter) -> String {
    let from = match mode {
        TableMode::Document => quote_ident(collection),
        TableMode::Relational => format!("{} AS t", quote_ident(collection)),
    };
    format!("SELECT COUNT(*) FROM {}{}", from, render_where(mode, filter))
}

fn render_update(mode: TableMode, collection: &str, filter: &Filter, update: &FieldUpdate) -> String {
    let assignments = match mode {
        TableMode::Document => {
            let mut expr = "doc".to_string();
            for (path, value) in update.fields() {
                expr = format!(
                    "jsonb_set({}, {}, {}, true)",
                    expr,
                    jsonb_path(path),
                    format_json_value(value)
                );
            }
            format!("doc = {expr}")
        }
        TableMode::Relational => update
            .fields()
            .iter()
            .map(|(path, value)| format!("{} = {}", quote_ident(path), format_value(value)))
            .collect::<Vec<_>>()
            .join(", "),
    };
    format!(
        "UPDATE {} SET {}{}",
        quote_ident(collection),
        assignments,
        render_where(mode, filter)
    )
}

fn render_delete(mode: TableMode, collection: &str, filter: &Filter) -> String {
    format!(
        "DELETE FROM {}{}",
        quote_ident(collection),
        render_where(mode, filter)
    )
}

/// Format a JSON value for SQL
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        _ => format!("'{}'", value.to_string().replace('\'', "''")),
    }
}

/// Format a JSON value for JSONB operations
fn format_json_value(value: &Value) -> String {
    format!("'{}'::jsonb", value.to_string().replace('\'', "''"))
}
