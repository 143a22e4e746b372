//! Top-level engine error type

use uuid::Uuid;

use super::StoreError;
use super::ValidationError;

/// The kind of entity a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A table id.
    Table,
    /// A column id.
    Column,
    /// A row id.
    Row,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
            Self::Row => write!(f, "row"),
        }
    }
}

/// Errors returned by the engine's operations.
///
/// Rows missing cells are deliberately NOT represented here: an absent cell
/// is an expected consistency gap (interrupted bulk insert, column added
/// after rows existed) and surfaces as an empty value at read time instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request parameter was out of bounds; rejected before any write.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An id did not resolve to an entity visible to the caller.
    #[error("{resource} {id} not found")]
    NotFound {
        /// The kind of entity looked up.
        resource: Resource,
        /// The id that failed to resolve.
        id: Uuid,
    },

    /// The storage backend failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The operation was cancelled. Work committed before the cancellation
    /// point (completed bulk-insert chunks) remains committed.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Creates a not-found error.
    pub fn not_found(resource: Resource, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    /// Returns `true` if this is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
