//! Redis-based cache store.

use super::CacheStore;
use clinica_core::{ClinicaError, ClinicaResult};
use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands, ErrorKind, RedisError};
use deadpool_redis::Pool;
use shaku::Component;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Keys fetched per SCAN round trip when deleting by pattern.
const SCAN_BATCH: usize = 100;

/// Redis-based cache store.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisCacheStore {
    /// Redis connection pool. `None` disables caching.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheStore {
    /// Create a new Redis cache store.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache store (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> ClinicaResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                ClinicaError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(ClinicaError::Cache("Cache is disabled".to_string())),
        }
    }
}

/// Maps a command failure. `WRONGTYPE` replies mean the key holds a value of
/// another shape and are surfaced as a corrupt entry.
fn command_error(key: &str, action: &str, err: RedisError) -> ClinicaError {
    if err.code() == Some("WRONGTYPE") || err.kind() == ErrorKind::TypeError {
        return ClinicaError::corrupt_entry(key, err);
    }
    ClinicaError::Cache(format!("Failed to {} key '{}': {}", action, key, err))
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> ClinicaResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| command_error(key, "get", e))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> ClinicaResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl_secs(ttl);

        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|e| command_error(key, "set", e))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> ClinicaResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| command_error(key, "delete", e))?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> ClinicaResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| ClinicaError::Cache(format!("Failed to scan keys: {}", e)))?;

            if !keys.is_empty() {
                let removed: u64 = conn.del(&keys).await.map_err(|e| {
                    ClinicaError::Cache(format!("Failed to delete keys: {}", e))
                })?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
        Ok(deleted)
    }

    async fn hash_get(&self, key: &str) -> ClinicaResult<HashMap<String, String>> {
        if !self.is_enabled() {
            return Ok(HashMap::new());
        }

        let mut conn = self.get_conn().await?;
        let fields: HashMap<String, String> = conn
            .hgetall(key)
            .await
            .map_err(|e| command_error(key, "read hash", e))?;

        Ok(fields)
    }

    async fn hash_set(&self, key: &str, fields: &[(String, String)], ttl: Duration) -> ClinicaResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let mut pipe = redis::pipe();
        pipe.atomic().del(key).ignore();
        if !fields.is_empty() {
            pipe.hset_multiple(key, fields)
                .ignore()
                .expire(key, i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX))
                .ignore();
        }

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error(key, "write hash", e))?;

        debug!("Cached hash '{}' ({} fields)", key, fields.len());
        Ok(())
    }

    async fn list_push(&self, key: &str, value: &str) -> ClinicaResult<u64> {
        let mut conn = self.get_conn().await?;
        let len: u64 = conn
            .rpush(key, value)
            .await
            .map_err(|e| command_error(key, "append to", e))?;
        Ok(len)
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> ClinicaResult<Vec<String>> {
        let mut conn = self.get_conn().await?;
        let values: Vec<String> = conn
            .lrange(key, start, stop)
            .await
            .map_err(|e| command_error(key, "read list", e))?;
        Ok(values)
    }

    async fn ping(&self) -> ClinicaResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ClinicaError::Cache(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}
