//! Caching infrastructure for the service layer.
//!
//! [`CacheStore`] is a purely mechanical key-value store with per-key
//! expiry. It has a Redis implementation for deployments and an in-memory
//! implementation for development and tests.

mod cache_store;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_store::{CacheStore, CacheStoreExt, Cached};
pub use memory_cache::{CacheEntries, InMemoryCacheStore, InMemoryCacheStoreParameters, MemoryEntry, MemoryValue};
pub use redis_cache::{RedisCacheStore, RedisCacheStoreParameters};

#[cfg(test)]
pub use cache_store::MockCacheStore;

use std::time::Duration;

/// Default TTL for cached patients and disease-history entries (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default TTL for online-status flags (1 hour).
pub const PRESENCE_TTL: Duration = Duration::from_secs(3600);

/// TTLs applied by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Patient blobs, entry hashes and list results.
    pub entity: Duration,
    /// Online-status flags.
    pub presence: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            entity: DEFAULT_TTL,
            presence: PRESENCE_TTL,
        }
    }
}

impl From<&clinica_config::CacheConfig> for CacheTtls {
    fn from(config: &clinica_config::CacheConfig) -> Self {
        Self {
            entity: config.entity_ttl(),
            presence: config.presence_ttl(),
        }
    }
}
