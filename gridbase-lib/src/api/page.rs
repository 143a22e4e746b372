//! Page type for paginated fetches.

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::model::RowData;

/// A page of rows with pagination information.
///
/// The cursor is opaque to callers: it identifies the first row beyond this
/// page, and feeding it back into the next fetch resumes the scan exactly
/// where this page ended, regardless of inserts elsewhere in the table.
///
/// # Example
///
/// ```ignore
/// let mut pages = client.pages(table_id).limit(100).into_pages();
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     for row in page.rows() {
///         println!("{}", row.id());
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    rows: Vec<RowData>,
    /// Id of the first row beyond this page, if another page exists.
    next_cursor: Option<Uuid>,
}

impl Page {
    /// Creates a new page with no next cursor.
    pub fn new(rows: Vec<RowData>) -> Self {
        Self {
            rows,
            next_cursor: None,
        }
    }

    /// Sets the cursor to the next page.
    pub fn with_next_cursor(mut self, next_cursor: Uuid) -> Self {
        self.next_cursor = Some(next_cursor);
        self
    }

    /// Returns the rows in this page.
    pub fn rows(&self) -> &[RowData] {
        &self.rows
    }

    /// Consumes the page and returns the rows.
    pub fn into_rows(self) -> Vec<RowData> {
        self.rows
    }

    /// Returns the cursor to the next page, if one exists.
    pub fn next_cursor(&self) -> Option<Uuid> {
        self.next_cursor
    }

    /// Returns `true` if there is another page after this one.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
