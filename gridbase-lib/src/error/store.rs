//! Storage backend error types

/// Errors surfaced by a [`crate::store::TableStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite backend failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] async_sqlite::Error),

    /// A stored value could not be decoded into a model type.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Backend-specific failure from a custom store implementation.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
