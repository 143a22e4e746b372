//! SQLite-backed persistent store implementation.

use std::path::Path;

use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use super::RowCursor;
use super::TableStore;
use crate::error::StoreError;
use crate::model::Cell;
use crate::model::Column;
use crate::model::ColumnType;
use crate::model::Row;
use crate::model::RowData;
use crate::model::Table;

/// A persistent store backed by SQLite.
///
/// Uses WAL journal mode for better concurrent read performance. Timestamps
/// are stored as microseconds since the epoch and ids as their canonical
/// hyphenated text form, whose lexicographic order matches byte order, so
/// the `(created_at, id)` index realizes the same total order as
/// [`super::MemoryStore`].
///
/// # Example
///
/// ```ignore
/// use gridbase_lib::store::SqliteStore;
///
/// // File-based store
/// let store = SqliteStore::open("grid.db").await?;
///
/// // In-memory store (for testing)
/// let store = SqliteStore::open_in_memory().await?;
/// ```
pub struct SqliteStore {
    client: Client,
}

impl SqliteStore {
    /// Opens a SQLite store at the specified path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory SQLite store.
    ///
    /// Useful for testing. Data is lost when the store is dropped.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), StoreError> {
        client
            .conn(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS tables (
                        id TEXT PRIMARY KEY,
                        base_id TEXT NOT NULL,
                        name TEXT NOT NULL
                    );
                    CREATE TABLE IF NOT EXISTS columns (
                        id TEXT PRIMARY KEY,
                        table_id TEXT NOT NULL,
                        name TEXT NOT NULL,
                        column_type TEXT NOT NULL,
                        created_at INTEGER NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS idx_columns_table
                        ON columns(table_id, created_at, id);
                    CREATE TABLE IF NOT EXISTS rows (
                        id TEXT PRIMARY KEY,
                        table_id TEXT NOT NULL,
                        created_at INTEGER NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS idx_rows_order
                        ON rows(table_id, created_at, id);
                    CREATE TABLE IF NOT EXISTS cells (
                        id TEXT PRIMARY KEY,
                        row_id TEXT NOT NULL,
                        column_id TEXT NOT NULL,
                        value TEXT NOT NULL,
                        UNIQUE (row_id, column_id)
                    );",
                )
            })
            .await?;
        Ok(())
    }
}

fn parse_uuid(text: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(text).map_err(|e| StoreError::encoding(format!("invalid uuid {text}: {e}")))
}

fn parse_timestamp(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::encoding(format!("timestamp out of range: {micros}")))
}

fn parse_column_type(text: &str) -> Result<ColumnType, StoreError> {
    match text {
        "TEXT" => Ok(ColumnType::Text),
        "NUMBER" => Ok(ColumnType::Number),
        other => Err(StoreError::encoding(format!("unknown column type: {other}"))),
    }
}

type RowTuple = (String, String, i64);
type CellTuple = (String, String, String, String);

fn row_from_tuple((id, table_id, created_at): &RowTuple) -> Result<Row, StoreError> {
    Ok(Row {
        id: parse_uuid(id)?,
        table_id: parse_uuid(table_id)?,
        created_at: parse_timestamp(*created_at)?,
    })
}

fn cell_from_tuple((id, row_id, column_id, value): CellTuple) -> Result<Cell, StoreError> {
    Ok(Cell {
        id: parse_uuid(&id)?,
        row_id: parse_uuid(&row_id)?,
        column_id: parse_uuid(&column_id)?,
        value,
    })
}

#[async_trait]
impl TableStore for SqliteStore {
    async fn create_table(&self, table: Table) -> Result<(), StoreError> {
        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO tables (id, base_id, name) VALUES (?1, ?2, ?3)",
                    rusqlite::params![
                        table.id.to_string(),
                        table.base_id.to_string(),
                        table.name
                    ],
                )
            })
            .await?;
        Ok(())
    }

    async fn get_table(&self, table_id: Uuid) -> Result<Option<Table>, StoreError> {
        let found = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT id, base_id, name FROM tables WHERE id = ?1",
                    [table_id.to_string()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()
            })
            .await?;

        match found {
            Some((id, base_id, name)) => Ok(Some(Table {
                id: parse_uuid(&id)?,
                base_id: parse_uuid(&base_id)?,
                name,
            })),
            None => Ok(None),
        }
    }

    async fn insert_column(&self, column: Column) -> Result<(), StoreError> {
        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO columns (id, table_id, name, column_type, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        column.id.to_string(),
                        column.table_id.to_string(),
                        column.name,
                        column.column_type.to_string(),
                        column.created_at.timestamp_micros()
                    ],
                )
            })
            .await?;
        Ok(())
    }

    async fn list_columns(&self, table_id: Uuid) -> Result<Vec<Column>, StoreError> {
        let tuples = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, table_id, name, column_type, created_at
                       FROM columns
                      WHERE table_id = ?1
                      ORDER BY created_at, id",
                )?;
                let tuples = stmt
                    .query_map([table_id.to_string()], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(tuples)
            })
            .await?;

        tuples
            .into_iter()
            .map(|(id, table_id, name, column_type, created_at)| {
                Ok(Column {
                    id: parse_uuid(&id)?,
                    table_id: parse_uuid(&table_id)?,
                    name,
                    column_type: parse_column_type(&column_type)?,
                    created_at: parse_timestamp(created_at)?,
                })
            })
            .collect()
    }

    async fn insert_rows(&self, table_id: Uuid, count: usize) -> Result<(), StoreError> {
        // One transaction, one timestamp for the whole batch; ids break ties.
        let now = Utc::now().timestamp_micros();
        self.client
            .conn_mut(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO rows (id, table_id, created_at) VALUES (?1, ?2, ?3)",
                    )?;
                    let table_id = table_id.to_string();
                    for _ in 0..count {
                        stmt.execute(rusqlite::params![
                            Uuid::new_v4().to_string(),
                            table_id,
                            now
                        ])?;
                    }
                }
                tx.commit()
            })
            .await?;
        Ok(())
    }

    async fn recent_row_ids(&self, table_id: Uuid, count: usize) -> Result<Vec<Uuid>, StoreError> {
        let ids = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id FROM rows
                      WHERE table_id = ?1
                      ORDER BY created_at DESC, id DESC
                      LIMIT ?2",
                )?;
                let ids = stmt
                    .query_map(
                        rusqlite::params![table_id.to_string(), count as i64],
                        |row| row.get::<_, String>(0),
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ids)
            })
            .await?;

        ids.iter().map(|id| parse_uuid(id)).collect()
    }

    async fn get_row(&self, row_id: Uuid) -> Result<Option<Row>, StoreError> {
        let found = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT id, table_id, created_at FROM rows WHERE id = ?1",
                    [row_id.to_string()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()
            })
            .await?;

        found.as_ref().map(row_from_tuple).transpose()
    }

    async fn list_rows(
        &self,
        table_id: Uuid,
        after: Option<RowCursor>,
        limit: usize,
        substring: Option<&str>,
    ) -> Result<Vec<RowData>, StoreError> {
        let has_cursor = after.is_some();
        let cursor_micros = after.map(|c| c.created_at.timestamp_micros()).unwrap_or(0);
        let cursor_id = after.map(|c| c.row_id.to_string()).unwrap_or_default();
        let needle = substring.unwrap_or("").to_string();

        let (row_tuples, cell_tuples) = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, table_id, created_at FROM rows
                      WHERE table_id = ?1
                        AND (?2 = 0 OR created_at > ?3 OR (created_at = ?3 AND id > ?4))
                        AND (?5 = '' OR EXISTS (
                            SELECT 1 FROM cells
                             WHERE cells.row_id = rows.id
                               AND instr(cells.value, ?5) > 0))
                      ORDER BY created_at, id
                      LIMIT ?6",
                )?;
                let row_tuples: Vec<RowTuple> = stmt
                    .query_map(
                        rusqlite::params![
                            table_id.to_string(),
                            has_cursor as i64,
                            cursor_micros,
                            cursor_id,
                            needle,
                            limit as i64
                        ],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut cell_tuples: Vec<CellTuple> = Vec::new();
                if !row_tuples.is_empty() {
                    let placeholders = vec!["?"; row_tuples.len()].join(",");
                    let sql = format!(
                        "SELECT id, row_id, column_id, value FROM cells WHERE row_id IN ({placeholders})"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let ids = row_tuples.iter().map(|t| t.0.clone());
                    cell_tuples = stmt
                        .query_map(rusqlite::params_from_iter(ids), |row| {
                            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                        })?
                        .collect::<Result<Vec<_>, _>>()?;
                }

                Ok((row_tuples, cell_tuples))
            })
            .await?;

        let mut out = Vec::with_capacity(row_tuples.len());
        let mut index = std::collections::HashMap::with_capacity(row_tuples.len());
        for tuple in &row_tuples {
            let row = row_from_tuple(tuple)?;
            index.insert(row.id, out.len());
            out.push(RowData::new(row));
        }
        for tuple in cell_tuples {
            let cell = cell_from_tuple(tuple)?;
            if let Some(&i) = index.get(&cell.row_id) {
                out[i].insert_cell(cell);
            }
        }
        Ok(out)
    }

    async fn insert_cells(&self, cells: Vec<Cell>) -> Result<(), StoreError> {
        self.client
            .conn_mut(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO cells (id, row_id, column_id, value)
                         VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for cell in &cells {
                        stmt.execute(rusqlite::params![
                            cell.id.to_string(),
                            cell.row_id.to_string(),
                            cell.column_id.to_string(),
                            cell.value
                        ])?;
                    }
                }
                tx.commit()
            })
            .await?;
        Ok(())
    }

    async fn get_cell(&self, row_id: Uuid, column_id: Uuid) -> Result<Option<Cell>, StoreError> {
        let found = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT id, row_id, column_id, value FROM cells
                      WHERE row_id = ?1 AND column_id = ?2",
                    rusqlite::params![row_id.to_string(), column_id.to_string()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()
            })
            .await?;

        found.map(cell_from_tuple).transpose()
    }

    async fn upsert_cell(
        &self,
        row_id: Uuid,
        column_id: Uuid,
        value: String,
    ) -> Result<Cell, StoreError> {
        let tuple = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "INSERT INTO cells (id, row_id, column_id, value)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (row_id, column_id) DO UPDATE SET value = excluded.value
                     RETURNING id, row_id, column_id, value",
                    rusqlite::params![
                        Uuid::new_v4().to_string(),
                        row_id.to_string(),
                        column_id.to_string(),
                        value
                    ],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
            })
            .await?;

        cell_from_tuple(tuple)
    }

    async fn count_rows(&self, table_id: Uuid) -> Result<usize, StoreError> {
        let count = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM rows WHERE table_id = ?1",
                    [table_id.to_string()],
                    |row| row.get::<_, i64>(0),
                )
            })
            .await?;
        Ok(count as usize)
    }
}
