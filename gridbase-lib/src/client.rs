//! Main GridClient

use std::sync::Arc;

use crate::api::DEFAULT_CELL_CHUNK_SIZE;
use crate::cache::CacheConfig;
use crate::cache::CacheProvider;
use crate::cache::InMemoryCache;
use crate::store::TableStore;

/// The client for the table engine.
///
/// Bundles a [`TableStore`] backend with a page cache and exposes the
/// engine's operations: paginated (optionally search-filtered) row
/// fetching, bulk row generation, single-cell edits and column addition.
/// The client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```
/// use gridbase_lib::GridClient;
/// use gridbase_lib::store::MemoryStore;
///
/// let client = GridClient::builder().store(MemoryStore::new()).build();
/// ```
#[derive(Clone)]
pub struct GridClient {
    inner: Arc<GridClientInner>,
}

struct GridClientInner {
    store: Arc<dyn TableStore>,
    cache: Arc<dyn CacheProvider>,
    cache_config: CacheConfig,
    cell_chunk_size: usize,
}

impl GridClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> GridClientBuilder<Missing> {
        GridClientBuilder::new()
    }

    /// Returns the storage backend.
    ///
    /// Collaborators that own table lifecycle (creation, seeding) go
    /// through this handle; the engine's own operations never create
    /// tables.
    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.inner.store
    }

    /// Returns the page cache.
    pub fn cache(&self) -> &Arc<dyn CacheProvider> {
        &self.inner.cache
    }

    pub(crate) fn cache_config(&self) -> &CacheConfig {
        &self.inner.cache_config
    }

    pub(crate) fn cell_chunk_size(&self) -> usize {
        self.inner.cell_chunk_size
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`GridClient`].
///
/// Uses the typestate pattern to ensure the required store is set at
/// compile time.
///
/// # Example
///
/// ```
/// use gridbase_lib::GridClient;
/// use gridbase_lib::cache::CacheConfig;
/// use gridbase_lib::store::MemoryStore;
///
/// let client = GridClient::builder()
///     .store(MemoryStore::new())
///     .cache_config(CacheConfig::default())
///     .cell_chunk_size(10_000)
///     .build();
/// ```
pub struct GridClientBuilder<S> {
    store: S,
    cache: Option<Arc<dyn CacheProvider>>,
    cache_config: CacheConfig,
    cell_chunk_size: usize,
}

impl GridClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            store: Missing,
            cache: None,
            cache_config: CacheConfig::default(),
            cell_chunk_size: DEFAULT_CELL_CHUNK_SIZE,
        }
    }

    /// Sets the storage backend.
    pub fn store<T: TableStore + 'static>(
        self,
        store: T,
    ) -> GridClientBuilder<Set<Arc<dyn TableStore>>> {
        GridClientBuilder {
            store: Set(Arc::new(store) as Arc<dyn TableStore>),
            cache: self.cache,
            cache_config: self.cache_config,
            cell_chunk_size: self.cell_chunk_size,
        }
    }
}

impl Default for GridClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> GridClientBuilder<S> {
    /// Sets the cache provider.
    ///
    /// If not set, an [`InMemoryCache`] is created.
    pub fn cache<C: CacheProvider + 'static>(mut self, cache: C) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Sets the cache configuration.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Sets the number of cells written per bulk-insert chunk.
    ///
    /// Defaults to [`DEFAULT_CELL_CHUNK_SIZE`]. Values below 1 are treated
    /// as 1.
    pub fn cell_chunk_size(mut self, size: usize) -> Self {
        self.cell_chunk_size = size.max(1);
        self
    }
}

impl GridClientBuilder<Set<Arc<dyn TableStore>>> {
    /// Builds the [`GridClient`].
    ///
    /// This method is only available once a store has been set.
    pub fn build(self) -> GridClient {
        GridClient {
            inner: Arc::new(GridClientInner {
                store: self.store.0,
                cache: self
                    .cache
                    .unwrap_or_else(|| Arc::new(InMemoryCache::new())),
                cache_config: self.cache_config,
                cell_chunk_size: self.cell_chunk_size,
            }),
        }
    }
}
