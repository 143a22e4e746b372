//! Storage boundary for the table engine
//!
//! [`TableStore`] is the contract the engine consumes from an ordered
//! relational backend: ordered row listing with cursor/limit and an
//! optional substring predicate, batched row and cell creation, single-cell
//! upsert, and column listing. Two implementations ship with the crate:
//! [`MemoryStore`] (the default and the test substrate) and [`SqliteStore`]
//! (persistent, WAL-journaled).

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::Cell;
use crate::model::Column;
use crate::model::Row;
use crate::model::RowData;
use crate::model::Table;

/// The position of a row in its table's total order.
///
/// Listing resumes strictly after this position (the row itself is
/// skipped), so a cursor derived from the last row of one page starts the
/// next page at the first unseen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCursor {
    /// The row's creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The row's id, breaking timestamp ties.
    pub row_id: Uuid,
}

impl From<&Row> for RowCursor {
    fn from(row: &Row) -> Self {
        Self {
            created_at: row.created_at,
            row_id: row.id,
        }
    }
}

/// The ordered relational backend the engine runs against.
///
/// Implementations must provide a strict total order over a table's rows by
/// `(created_at, id)` and apply it consistently to [`TableStore::list_rows`]
/// and [`TableStore::recent_row_ids`]. No isolation is expected between
/// calls: a concurrent insert may shift page boundaries between requests,
/// and the engine is written to tolerate that.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Creates a table. Consumed by collaborators that own table lifecycle;
    /// the engine itself only ever reads tables.
    async fn create_table(&self, table: Table) -> Result<(), StoreError>;

    /// Looks up a table by id.
    async fn get_table(&self, table_id: Uuid) -> Result<Option<Table>, StoreError>;

    /// Appends a column to its table.
    async fn insert_column(&self, column: Column) -> Result<(), StoreError>;

    /// Lists a table's columns in creation order.
    async fn list_columns(&self, table_id: Uuid) -> Result<Vec<Column>, StoreError>;

    /// Creates `count` bare rows for the table in one batched write.
    ///
    /// Ids and timestamps are generated by the store and are NOT returned;
    /// callers that need the new ids read them back with
    /// [`TableStore::recent_row_ids`].
    async fn insert_rows(&self, table_id: Uuid, count: usize) -> Result<(), StoreError>;

    /// Returns the ids of the `count` most recently created rows of the
    /// table, creation-descending.
    async fn recent_row_ids(&self, table_id: Uuid, count: usize) -> Result<Vec<Uuid>, StoreError>;

    /// Looks up a row by id.
    async fn get_row(&self, row_id: Uuid) -> Result<Option<Row>, StoreError>;

    /// Lists up to `limit` rows of the table, with embedded cells, strictly
    /// after `after` in the total order.
    ///
    /// When `substring` is present, only rows where at least one cell value
    /// contains it (case-sensitively) are returned; the predicate restricts
    /// the scan without changing the order.
    async fn list_rows(
        &self,
        table_id: Uuid,
        after: Option<RowCursor>,
        limit: usize,
        substring: Option<&str>,
    ) -> Result<Vec<RowData>, StoreError>;

    /// Inserts cells in one batched write.
    ///
    /// Callers bound the batch size; a single call is never asked to absorb
    /// an unbounded payload.
    async fn insert_cells(&self, cells: Vec<Cell>) -> Result<(), StoreError>;

    /// Looks up the cell at (row, column).
    async fn get_cell(&self, row_id: Uuid, column_id: Uuid) -> Result<Option<Cell>, StoreError>;

    /// Overwrites the cell at (row, column), creating it if absent.
    ///
    /// The caller is responsible for having validated that the row and
    /// column exist and belong to the same table.
    async fn upsert_cell(
        &self,
        row_id: Uuid,
        column_id: Uuid,
        value: String,
    ) -> Result<Cell, StoreError>;

    /// Counts the table's rows.
    async fn count_rows(&self, table_id: Uuid) -> Result<usize, StoreError>;
}
