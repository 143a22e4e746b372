//! Generic caching layer
//!
//! Provides a `CacheProvider` trait and an in-memory implementation for
//! caching serialized data. The engine uses it to cache fetched pages per
//! table; mutations invalidate a whole table's pages at once through
//! [`CacheProvider::remove_prefix`].

mod config;
mod memory;

pub use config::*;
pub use memory::*;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

/// A cached value with metadata about when it was cached and when, if ever,
/// it expires.
///
/// Page caches are primarily invalidation-driven, so `expires_at` is
/// optional: `None` means the value lives until it is removed.
#[derive(Debug, Clone)]
pub struct CachedValue {
    /// The cached data, serialized as bytes (typically via bincode).
    pub data: Vec<u8>,
    /// When this value was cached.
    pub created_at: DateTime<Utc>,
    /// When this value expires, or `None` for until-invalidated.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedValue {
    /// Creates a new cached value.
    pub fn new(data: Vec<u8>, created_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            data,
            created_at,
            expires_at,
        }
    }

    /// Creates a new cached value stamped now, with an optional TTL.
    pub fn with_ttl(data: Vec<u8>, ttl: Option<std::time::Duration>) -> Self {
        let now = Utc::now();
        let expires_at = ttl.map(|ttl| {
            now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero())
        });
        Self {
            data,
            created_at: now,
            expires_at,
        }
    }

    /// Returns `true` if this cached value has expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }
}

/// Trait for cache providers.
///
/// Implementations store and retrieve cached values by string keys. The
/// provider is responsible for:
/// - Never returning expired values from `get()`
/// - Storing values with their expiration metadata
/// - Removing whole key families by prefix for invalidation
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Retrieves a cached value by key.
    ///
    /// Returns `None` if the key doesn't exist or the value has expired.
    async fn get(&self, key: &str) -> Option<CachedValue>;

    /// Stores a value in the cache.
    async fn set(&self, key: &str, value: CachedValue);

    /// Removes a value from the cache.
    async fn remove(&self, key: &str);

    /// Removes every value whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    async fn remove_prefix(&self, prefix: &str) -> usize;

    /// Clears all values from the cache.
    async fn clear(&self);

    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    async fn gc(&self) -> usize;
}
