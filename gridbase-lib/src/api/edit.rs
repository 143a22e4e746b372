//! Single-cell edits and column addition.
//!
//! Mutations are narrow (one cell, or one appended column) but their
//! cache effect is deliberately coarse: every cached page of the affected
//! table is invalidated, so a stale page can never be served after a
//! successful edit. Patching the specific cached page would be a valid
//! refinement; invalidation is the baseline that is always correct.

use log::debug;
use uuid::Uuid;

use crate::api::query::page_cache_prefix;
use crate::cache::CacheProvider;
use crate::error::Error;
use crate::error::Resource;
use crate::error::ValidationError;
use crate::model::Cell;
use crate::model::Column;
use crate::model::ColumnType;
use crate::store::TableStore;
use crate::GridClient;

impl GridClient {
    /// Overwrites the cell at (row, column), creating it if absent.
    ///
    /// The upsert covers rows that never got a cell for the column, after
    /// a column was added to a populated table, or after an interrupted
    /// bulk insert, so an edit always lands.
    pub async fn update_cell(
        &self,
        row_id: Uuid,
        column_id: Uuid,
        value: impl Into<String>,
    ) -> Result<Cell, Error> {
        let value = value.into();

        let row = self
            .store()
            .get_row(row_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Row, row_id))?;
        let columns = self.store().list_columns(row.table_id).await?;
        if !columns.iter().any(|c| c.id == column_id) {
            return Err(Error::not_found(Resource::Column, column_id));
        }

        let cell = self.store().upsert_cell(row_id, column_id, value).await?;

        self.invalidate_pages(row.table_id).await;
        debug!("updated cell row={row_id} column={column_id}");
        Ok(cell)
    }

    /// Appends a column to the table and returns it.
    ///
    /// Existing rows get no cells for the new column; they read as empty
    /// until edited. The row shape changed, so the table's cached pages
    /// are invalidated.
    pub async fn add_column(
        &self,
        table_id: Uuid,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Result<Column, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty").into());
        }

        self.store()
            .get_table(table_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Table, table_id))?;

        let column = Column::new(table_id, name, column_type);
        self.store().insert_column(column.clone()).await?;

        self.invalidate_pages(table_id).await;
        debug!("added column {} to table {table_id}", column.id);
        Ok(column)
    }

    /// Lists the table's columns in creation order.
    pub async fn list_columns(&self, table_id: Uuid) -> Result<Vec<Column>, Error> {
        self.store()
            .get_table(table_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Table, table_id))?;
        Ok(self.store().list_columns(table_id).await?)
    }

    /// Drops every cached page of the table.
    pub(crate) async fn invalidate_pages(&self, table_id: Uuid) {
        let removed = self.cache().remove_prefix(&page_cache_prefix(table_id)).await;
        debug!("invalidated {removed} cached pages for table {table_id}");
    }
}
