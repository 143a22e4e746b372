//! Row and cell model types

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A row of a table.
///
/// Rows carry no values of their own; values live in [`Cell`]s keyed by
/// column. The creation timestamp is the sole sort key for pagination,
/// with the id breaking timestamp ties, so row order is a strict total
/// order that never changes after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The unique identifier of the row.
    pub id: Uuid,
    /// The table this row belongs to.
    pub table_id: Uuid,
    /// When the row was created; primary pagination sort key.
    pub created_at: DateTime<Utc>,
}

impl Row {
    /// Creates a new row with a fresh id, stamped now.
    pub fn new(table_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            table_id,
            created_at: Utc::now(),
        }
    }

    /// The row's position in the table's total order.
    pub fn sort_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}

/// A single cell value, jointly addressed by (row, column).
///
/// The value is opaque text regardless of the column's type; numeric
/// columns store the string representation of the number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The unique identifier of the cell.
    pub id: Uuid,
    /// The row this cell belongs to.
    pub row_id: Uuid,
    /// The column this cell is keyed by.
    pub column_id: Uuid,
    /// The cell value.
    pub value: String,
}

impl Cell {
    /// Creates a new cell with a fresh id.
    pub fn new(row_id: Uuid, column_id: Uuid, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            row_id,
            column_id,
            value: value.into(),
        }
    }
}

/// A row together with its cells, keyed by column id.
///
/// This is the shape that flows through pages, the page cache and the UI
/// boundary. A row may legitimately have fewer cells than its table has
/// columns (after a column is added to a populated table, or after an
/// interrupted bulk insert), so readers go through [`RowData::value_for`],
/// which resolves a missing cell to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    /// The row itself.
    pub row: Row,
    /// The row's cells, keyed by column id.
    pub cells: HashMap<Uuid, Cell>,
}

impl RowData {
    /// Creates row data with no cells.
    pub fn new(row: Row) -> Self {
        Self {
            row,
            cells: HashMap::new(),
        }
    }

    /// Creates row data from a row and its cells.
    pub fn with_cells(row: Row, cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            row,
            cells: cells.into_iter().map(|c| (c.column_id, c)).collect(),
        }
    }

    /// Returns the row id.
    pub fn id(&self) -> Uuid {
        self.row.id
    }

    /// Returns the cell for the given column, if present.
    pub fn cell(&self, column_id: Uuid) -> Option<&Cell> {
        self.cells.get(&column_id)
    }

    /// Returns the value for the given column.
    ///
    /// A missing cell reads as the empty string; an absent cell is expected
    /// data (see the crate docs on consistency gaps), not an error.
    pub fn value_for(&self, column_id: Uuid) -> &str {
        self.cells.get(&column_id).map(|c| c.value.as_str()).unwrap_or("")
    }

    /// Inserts or replaces a cell, keyed by its column id.
    pub fn insert_cell(&mut self, cell: Cell) {
        self.cells.insert(cell.column_id, cell);
    }

    /// Returns the number of cells present on this row.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
