//! Table and column model types

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A table: a named, ordered collection of columns and rows, owned by
/// exactly one base.
///
/// Base management (creation, ownership checks) lives outside this crate;
/// the engine only needs the table's identity to resolve requests against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// The unique identifier of the table.
    pub id: Uuid,
    /// The base this table belongs to.
    pub base_id: Uuid,
    /// Display name.
    pub name: String,
}

impl Table {
    /// Creates a new table with a fresh id.
    pub fn new(base_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            base_id,
            name: name.into(),
        }
    }
}

/// The type tag of a column.
///
/// Cell values are stored as opaque text regardless of the column type;
/// the tag only drives value synthesis and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// Free-form text.
    Text,
    /// Numeric, stored as the string representation of the number.
    Number,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "TEXT"),
            Self::Number => write!(f, "NUMBER"),
        }
    }
}

/// A column of a table.
///
/// Columns are append-only: display order is creation order and a column is
/// never reordered or retyped after creation. Duplicate names within a table
/// are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// The unique identifier of the column.
    pub id: Uuid,
    /// The table this column belongs to.
    pub table_id: Uuid,
    /// Display name; not unique within the table.
    pub name: String,
    /// The type tag.
    pub column_type: ColumnType,
    /// When the column was created; determines display order.
    pub created_at: DateTime<Utc>,
}

impl Column {
    /// Creates a new column with a fresh id, stamped now.
    pub fn new(table_id: Uuid, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: Uuid::new_v4(),
            table_id,
            name: name.into(),
            column_type,
            created_at: Utc::now(),
        }
    }
}
