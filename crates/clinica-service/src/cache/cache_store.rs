//! Cache store trait for abstracted caching operations.

use clinica_core::{ClinicaError, ClinicaResult, DiseaseHistory, Interface, Patient};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Key-value store with per-key expiry.
///
/// Owns no domain logic. Errors reaching the store are reported as
/// `ClinicaError::Cache` and never folded into a miss. A key holding a value
/// of the wrong shape for the operation is reported as `CorruptCacheEntry`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Gets a string value. Returns `None` if the key is absent or expired.
    async fn get_raw(&self, key: &str) -> ClinicaResult<Option<String>>;

    /// Sets a string value with a TTL, overwriting unconditionally.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> ClinicaResult<()>;

    /// Deletes a key. Deleting an absent key is not an error.
    ///
    /// Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> ClinicaResult<bool>;

    /// Deletes every key matching a glob pattern (`*` and `?`).
    ///
    /// Returns the number of keys deleted.
    async fn delete_pattern(&self, pattern: &str) -> ClinicaResult<u64>;

    /// Reads every field of a hash. Absent keys yield an empty map.
    async fn hash_get(&self, key: &str) -> ClinicaResult<HashMap<String, String>>;

    /// Replaces a hash with the given fields and sets its TTL.
    async fn hash_set(&self, key: &str, fields: &[(String, String)], ttl: Duration) -> ClinicaResult<()>;

    /// Appends a value to the tail of a list. Returns the new length.
    async fn list_push(&self, key: &str, value: &str) -> ClinicaResult<u64>;

    /// Reads a list range with inclusive bounds.
    ///
    /// Negative indices count from the tail, so `(0, -1)` is the whole list.
    async fn list_range(&self, key: &str, start: isize, stop: isize) -> ClinicaResult<Vec<String>>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> ClinicaResult<()>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Values that can be cached as JSON blobs.
pub trait Cached: Serialize + DeserializeOwned + Send + Sync {
    /// Returns false when a decoded value lacks a required identifier.
    fn is_intact(&self) -> bool;
}

impl Cached for DiseaseHistory {
    fn is_intact(&self) -> bool {
        !self.id.is_blank() && !self.patient_id.is_blank()
    }
}

impl Cached for Patient {
    fn is_intact(&self) -> bool {
        !self.id.is_blank() && self.disease_history.iter().all(Cached::is_intact)
    }
}

impl<T: Cached> Cached for Vec<T> {
    fn is_intact(&self) -> bool {
        self.iter().all(Cached::is_intact)
    }
}

/// Typed JSON access on top of [`CacheStore`].
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// Gets and decodes a cached value.
    ///
    /// A value that does not decode, or decodes without its identifiers, is
    /// reported as `CorruptCacheEntry`.
    async fn get<T: Cached>(&self, key: &str) -> ClinicaResult<Option<T>> {
        let Some(json) = self.get_raw(key).await? else {
            return Ok(None);
        };

        let value: T =
            serde_json::from_str(&json).map_err(|e| ClinicaError::corrupt_entry(key, e))?;
        if !value.is_intact() {
            return Err(ClinicaError::corrupt_entry(key, "missing identifier"));
        }
        Ok(Some(value))
    }

    /// Encodes and caches a value.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> ClinicaResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheStore + ?Sized> CacheStoreExt for T {}
