//! The store-facing seam.

use async_trait::async_trait;

use crate::dialect::NativeQuery;
use crate::materialize::Row;

/// Opaque executor failure.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

/// Raw output of one page query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub rows: Vec<Row>,
    /// Total reported alongside the page (search indices)
    pub total: Option<u64>,
    /// Raw paging state for the next page (cursor-paged stores)
    pub next_cursor: Option<Vec<u8>>,
}

impl RowSet {
    /// Rows with no reported total and no continuation.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Total reported alongside the rows by the store.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Raw paging state for the next page.
    pub fn with_next_cursor(mut self, cursor: Vec<u8>) -> Self {
        self.next_cursor = Some(cursor);
        self
    }
}

/// Runs native queries against a store. Owns the connection; sift never
/// does I/O itself.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn fetch(&self, query: &NativeQuery) -> Result<RowSet, ExecutorError>;

    async fn count(&self, query: &NativeQuery) -> Result<u64, ExecutorError>;
}
