//! Cache configuration

use std::time::Duration;

/// Configuration for page caching.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridbase_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default().with_page_ttl(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// TTL for cached pages.
    ///
    /// Default: `None`; pages stay cached until a mutation invalidates
    /// them, which is the consistency mechanism the engine relies on. Set a
    /// TTL to additionally age pages out under external writers the engine
    /// cannot observe.
    pub page_ttl: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page TTL.
    pub fn with_page_ttl(mut self, ttl: Duration) -> Self {
        self.page_ttl = Some(ttl);
        self
    }
}
