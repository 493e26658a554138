//! # Paginated Scanner
//!
//! Lazy, finite, non-restartable walk over every record matching a filter,
//! one page buffered in memory at a time.
//!
//! Page 1 is fetched with the combined list + count call; the returned total
//! fixes the page count for the whole scan. Pages `2..=total_pages` are
//! fetched with a plain list using the same filter and size, and the total
//! is **never** refreshed. When a handler deletes matching rows mid-scan,
//! later rows shift forward across page boundaries and the scan can skip
//! (or double-visit) records. This snapshot inconsistency is a documented,
//! intentionally preserved limitation of the engine, covered by a
//! regression test; do not "fix" it here without revisiting every operation
//! that deletes while scanning.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{Document, Filter, Store};

/// Default page size for every scan in the system.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Number of pages needed to cover `total` records at `page_size` per page.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)) as u32
}

/// Position of a scan within its result set. The total is a snapshot taken
/// on page 1 and holds for the scan's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// Current page, 1-indexed.
    pub page: u32,
    pub page_size: u32,
    /// Matches reported by the page-1 count.
    pub total: u64,
    /// `ceil(total / page_size)`.
    pub total_pages: u32,
}

impl PageCursor {
    fn first_page(page_size: u32, total: u64) -> Self {
        Self {
            page: 1,
            page_size,
            total,
            total_pages: total_pages(total, page_size),
        }
    }

    fn on_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// One scan over one collection and filter.
pub struct Scan {
    store: Arc<dyn Store>,
    collection: String,
    filter: Filter,
    page_size: u32,
    cursor: Option<PageCursor>,
    buffer: VecDeque<Document>,
    visited: u64,
    done: bool,
}

impl Scan {
    pub fn new(
        store: Arc<dyn Store>,
        collection: impl Into<String>,
        filter: Filter,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            filter,
            page_size,
            cursor: None,
            buffer: VecDeque::new(),
            visited: 0,
            done: false,
        }
    }

    /// Yield the next record, fetching the next page when the buffer runs
    /// dry. Returns `Ok(None)` once the scan is exhausted; errors are left
    /// to the caller to classify.
    pub async fn try_next(&mut self) -> Result<Option<Document>, StoreError> {
        loop {
            if let Some(doc) = self.buffer.pop_front() {
                self.visited += 1;
                return Ok(Some(doc));
            }
            if self.done {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
    }

    async fn fetch_next_page(&mut self) -> Result<(), StoreError> {
        match self.cursor {
            None => {
                let (items, total) = self
                    .store
                    .list_counted(&self.collection, &self.filter, 1, self.page_size)
                    .await?;
                let cursor = PageCursor::first_page(self.page_size, total);
                // A scan over zero matches performs zero handler invocations.
                self.done = cursor.on_last_page() || items.is_empty();
                self.cursor = Some(cursor);
                self.buffer.extend(items);
            }
            Some(ref mut cursor) => {
                if cursor.on_last_page() {
                    self.done = true;
                    return Ok(());
                }
                cursor.page += 1;
                let items = self
                    .store
                    .list(&self.collection, &self.filter, cursor.page, self.page_size)
                    .await?;
                // The store ran dry earlier than the snapshot total implied.
                if items.is_empty() {
                    self.done = true;
                }
                self.buffer.extend(items);
            }
        }
        Ok(())
    }

    /// Records yielded so far.
    pub fn visited(&self) -> u64 {
        self.visited
    }

    /// The cursor, once page 1 has been fetched.
    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }
}
