//! In-memory store implementation

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::ops::Bound;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::RowCursor;
use super::TableStore;
use crate::error::StoreError;
use crate::model::Cell;
use crate::model::Column;
use crate::model::Row;
use crate::model::RowData;
use crate::model::Table;

/// An in-memory store backed by concurrent maps.
///
/// Rows are held in a per-table ordered map keyed by `(created_at, id)`, so
/// cursor listing is a range scan. This is the default store and the
/// substrate the test suites run against; data is lost when the process
/// exits.
///
/// # Example
///
/// ```
/// use gridbase_lib::store::MemoryStore;
///
/// let store = MemoryStore::new();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<Uuid, Table>,
    /// Columns per table, in creation order.
    columns: DashMap<Uuid, Vec<Column>>,
    /// Rows per table, ordered by the pagination sort key.
    rows: DashMap<Uuid, BTreeMap<(DateTime<Utc>, Uuid), Row>>,
    /// Row lookup by id, for cursor resolution and edits.
    row_index: DashMap<Uuid, Row>,
    /// Cells per row, keyed by column id.
    cells: DashMap<Uuid, HashMap<Uuid, Cell>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn row_data(&self, row: &Row) -> RowData {
        let cells = self
            .cells
            .get(&row.id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        RowData {
            row: row.clone(),
            cells,
        }
    }

    fn row_matches(&self, row_id: Uuid, substring: &str) -> bool {
        self.cells
            .get(&row_id)
            .map(|entry| entry.values().any(|cell| cell.value.contains(substring)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn create_table(&self, table: Table) -> Result<(), StoreError> {
        let table_id = table.id;
        self.tables.insert(table_id, table);
        self.columns.entry(table_id).or_default();
        self.rows.entry(table_id).or_default();
        Ok(())
    }

    async fn get_table(&self, table_id: Uuid) -> Result<Option<Table>, StoreError> {
        Ok(self.tables.get(&table_id).map(|entry| entry.value().clone()))
    }

    async fn insert_column(&self, column: Column) -> Result<(), StoreError> {
        self.columns.entry(column.table_id).or_default().push(column);
        Ok(())
    }

    async fn list_columns(&self, table_id: Uuid) -> Result<Vec<Column>, StoreError> {
        Ok(self
            .columns
            .get(&table_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn insert_rows(&self, table_id: Uuid, count: usize) -> Result<(), StoreError> {
        // One batch, one timestamp: ties are broken by id, like a relational
        // backend stamping a whole batched insert with the same clock value.
        let now = Utc::now();
        let mut table_rows = self.rows.entry(table_id).or_default();
        for _ in 0..count {
            let row = Row {
                id: Uuid::new_v4(),
                table_id,
                created_at: now,
            };
            self.row_index.insert(row.id, row.clone());
            table_rows.insert(row.sort_key(), row);
        }
        Ok(())
    }

    async fn recent_row_ids(&self, table_id: Uuid, count: usize) -> Result<Vec<Uuid>, StoreError> {
        Ok(self
            .rows
            .get(&table_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .rev()
                    .take(count)
                    .map(|(_, row)| row.id)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_row(&self, row_id: Uuid) -> Result<Option<Row>, StoreError> {
        Ok(self.row_index.get(&row_id).map(|entry| entry.value().clone()))
    }

    async fn list_rows(
        &self,
        table_id: Uuid,
        after: Option<RowCursor>,
        limit: usize,
        substring: Option<&str>,
    ) -> Result<Vec<RowData>, StoreError> {
        let Some(table_rows) = self.rows.get(&table_id) else {
            return Ok(Vec::new());
        };

        let lower = match after {
            Some(cursor) => Bound::Excluded((cursor.created_at, cursor.row_id)),
            None => Bound::Unbounded,
        };

        let mut out = Vec::new();
        for (_, row) in table_rows.value().range((lower, Bound::Unbounded)) {
            if let Some(needle) = substring {
                if !self.row_matches(row.id, needle) {
                    continue;
                }
            }
            out.push(self.row_data(row));
            if out.len() == limit {
                break;
            }
        }
        Ok(out)
    }

    async fn insert_cells(&self, cells: Vec<Cell>) -> Result<(), StoreError> {
        for cell in cells {
            self.cells.entry(cell.row_id).or_default().insert(cell.column_id, cell);
        }
        Ok(())
    }

    async fn get_cell(&self, row_id: Uuid, column_id: Uuid) -> Result<Option<Cell>, StoreError> {
        Ok(self
            .cells
            .get(&row_id)
            .and_then(|entry| entry.get(&column_id).cloned()))
    }

    async fn upsert_cell(
        &self,
        row_id: Uuid,
        column_id: Uuid,
        value: String,
    ) -> Result<Cell, StoreError> {
        let mut row_cells = self.cells.entry(row_id).or_default();
        let cell = match row_cells.get_mut(&column_id) {
            Some(existing) => {
                existing.value = value;
                existing.clone()
            }
            None => {
                let cell = Cell::new(row_id, column_id, value);
                row_cells.insert(column_id, cell.clone());
                cell
            }
        };
        Ok(cell)
    }

    async fn count_rows(&self, table_id: Uuid) -> Result<usize, StoreError> {
        Ok(self
            .rows
            .get(&table_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_rows_share_a_timestamp_and_order_by_id() {
        let store = MemoryStore::new();
        let table = Table::new(Uuid::new_v4(), "t");
        let table_id = table.id;
        store.create_table(table).await.unwrap();
        store.insert_rows(table_id, 50).await.unwrap();

        let rows = store.list_rows(table_id, None, 100, None).await.unwrap();
        assert_eq!(rows.len(), 50);

        let mut ids: Vec<Uuid> = rows.iter().map(|r| r.id()).collect();
        let listed = ids.clone();
        ids.sort();
        assert_eq!(listed, ids, "equal timestamps must order by id");
    }

    #[tokio::test]
    async fn recent_row_ids_are_creation_descending() {
        let store = MemoryStore::new();
        let table = Table::new(Uuid::new_v4(), "t");
        let table_id = table.id;
        store.create_table(table).await.unwrap();
        store.insert_rows(table_id, 3).await.unwrap();
        store.insert_rows(table_id, 2).await.unwrap();

        let recent = store.recent_row_ids(table_id, 2).await.unwrap();
        let all = store.list_rows(table_id, None, 10, None).await.unwrap();
        let last_two: Vec<Uuid> = all.iter().rev().take(2).map(|r| r.id()).collect();
        assert_eq!(recent, last_two);
    }

    #[tokio::test]
    async fn substring_filter_is_case_sensitive() {
        let store = MemoryStore::new();
        let table = Table::new(Uuid::new_v4(), "t");
        let table_id = table.id;
        store.create_table(table).await.unwrap();
        let column = Column::new(table_id, "Name", crate::model::ColumnType::Text);
        let column_id = column.id;
        store.insert_column(column).await.unwrap();
        store.insert_rows(table_id, 2).await.unwrap();

        let ids = store.recent_row_ids(table_id, 2).await.unwrap();
        store.upsert_cell(ids[0], column_id, "Alpha".into()).await.unwrap();
        store.upsert_cell(ids[1], column_id, "alpha".into()).await.unwrap();

        let matches = store
            .list_rows(table_id, None, 10, Some("Alpha"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value_for(column_id), "Alpha");
    }
}
