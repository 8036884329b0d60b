//! Cache-aside coordination shared by the services.
//!
//! [`CacheAside`] owns the read-through and invalidation mechanics. It
//! decides nothing about *which* keys an operation touches; the services do
//! that. It guarantees three things:
//!
//! - a cache error other than a corrupt entry is propagated, never turned
//!   into a miss;
//! - a corrupt entry is deleted and the read falls through to the store;
//! - cache writes after a successful store write are best-effort.

use crate::cache::{cache_keys, CacheStore, CacheStoreExt, CacheTtls, Cached};
use clinica_core::{ClinicaError, ClinicaResult, DiseaseHistory, HistoryId, PatientId};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

/// Hash field holding the owning patient identifier.
pub const FIELD_PATIENT_ID: &str = "patient_id";

/// Hash field holding the disease name.
pub const FIELD_DISEASES_NAME: &str = "diseases_name";

fn record_hit(key: &str) {
    metrics::counter!("clinica_cache_hits_total", "family" => cache_keys::family(key).to_string())
        .increment(1);
}

fn record_miss(key: &str) {
    metrics::counter!("clinica_cache_misses_total", "family" => cache_keys::family(key).to_string())
        .increment(1);
}

fn record_corrupt(key: &str) {
    metrics::counter!(
        "clinica_cache_corrupt_entries_total",
        "family" => cache_keys::family(key).to_string()
    )
    .increment(1);
}

/// Hash fields for a disease-history entry.
#[must_use]
pub fn history_fields(entry: &DiseaseHistory) -> Vec<(String, String)> {
    vec![
        (FIELD_PATIENT_ID.to_string(), entry.patient_id.to_string()),
        (FIELD_DISEASES_NAME.to_string(), entry.diseases_name.clone()),
    ]
}

/// Rebuilds an entry from its hash fields.
///
/// Returns `None` when a field is missing or the hash names another owner.
#[must_use]
pub fn history_from_fields(
    patient_id: &PatientId,
    history_id: &HistoryId,
    fields: &HashMap<String, String>,
) -> Option<DiseaseHistory> {
    let owner = fields.get(FIELD_PATIENT_ID)?;
    let name = fields.get(FIELD_DISEASES_NAME)?;
    if owner != patient_id.as_str() {
        return None;
    }
    Some(DiseaseHistory::new(history_id.clone(), patient_id.clone(), name.clone()))
}

/// Cache-aside operations over one cache store.
#[derive(Clone, Copy)]
pub struct CacheAside<'a> {
    cache: &'a dyn CacheStore,
    ttls: CacheTtls,
}

impl<'a> CacheAside<'a> {
    #[must_use]
    pub fn new(cache: &'a dyn CacheStore, ttls: CacheTtls) -> Self {
        Self { cache, ttls }
    }

    /// TTLs in effect.
    #[must_use]
    pub const fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Reads a JSON value through the cache.
    ///
    /// On a miss `load` is called and a present result is cached with the
    /// entity TTL. `Ok(None)` means the store has no such value.
    pub async fn read_through<T, F, Fut>(&self, key: &str, load: F) -> ClinicaResult<Option<T>>
    where
        T: Cached,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ClinicaResult<Option<T>>> + Send,
    {
        if !self.cache.is_enabled() {
            return load().await;
        }

        match self.cache.get::<T>(key).await {
            Ok(Some(value)) => {
                record_hit(key);
                debug!("Serving '{}' from cache", key);
                return Ok(Some(value));
            }
            Ok(None) => record_miss(key),
            Err(e) if e.is_corrupt_entry() => self.discard_corrupt(key, &e).await?,
            Err(e) => return Err(e),
        }

        let Some(value) = load().await? else {
            return Ok(None);
        };
        self.populate(key, &value).await;
        Ok(Some(value))
    }

    /// Reads a list result through the cache.
    ///
    /// The whole result for one filter is cached as a single value.
    pub async fn read_list<T, F, Fut>(&self, key: &str, load: F) -> ClinicaResult<Vec<T>>
    where
        T: Cached,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ClinicaResult<Vec<T>>> + Send,
    {
        let list = self
            .read_through(key, move || async move { load().await.map(Some) })
            .await?;
        Ok(list.unwrap_or_default())
    }

    /// Reads one disease-history entry through its hash key.
    pub async fn read_history_entry<F, Fut>(
        &self,
        patient_id: &PatientId,
        history_id: &HistoryId,
        load: F,
    ) -> ClinicaResult<Option<DiseaseHistory>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ClinicaResult<Option<DiseaseHistory>>> + Send,
    {
        if !self.cache.is_enabled() {
            return load().await;
        }

        let key = cache_keys::history_entry(patient_id, history_id);
        match self.cache.hash_get(&key).await {
            Ok(fields) if fields.is_empty() => record_miss(&key),
            Ok(fields) => match history_from_fields(patient_id, history_id, &fields) {
                Some(entry) => {
                    record_hit(&key);
                    debug!("Serving '{}' from cache", key);
                    return Ok(Some(entry));
                }
                None => {
                    let err = ClinicaError::corrupt_entry(&key, "incomplete history hash");
                    self.discard_corrupt(&key, &err).await?;
                }
            },
            Err(e) if e.is_corrupt_entry() => self.discard_corrupt(&key, &e).await?,
            Err(e) => return Err(e),
        }

        let Some(entry) = load().await? else {
            return Ok(None);
        };
        self.populate_history_entry(&entry).await;
        Ok(Some(entry))
    }

    async fn discard_corrupt(&self, key: &str, err: &ClinicaError) -> ClinicaResult<()> {
        warn!("Discarding corrupt cache entry '{}': {}", key, err);
        record_corrupt(key);
        self.cache.delete(key).await?;
        Ok(())
    }

    /// Caches a value with the entity TTL. Failures are logged.
    pub async fn populate<T: Serialize + Send + Sync>(&self, key: &str, value: &T) {
        match self.cache.set(key, value, self.ttls.entity).await {
            Ok(()) => debug!("Populated cache key '{}'", key),
            Err(e) => warn!("Failed to populate cache key '{}': {}", key, e),
        }
    }

    /// Writes an entry hash, reporting failures.
    pub async fn store_history_entry(&self, entry: &DiseaseHistory) -> ClinicaResult<()> {
        let key = cache_keys::history_entry(&entry.patient_id, &entry.id);
        self.cache
            .hash_set(&key, &history_fields(entry), self.ttls.entity)
            .await?;
        debug!("Populated cache key '{}'", key);
        Ok(())
    }

    /// Writes an entry hash. Failures are logged.
    pub async fn populate_history_entry(&self, entry: &DiseaseHistory) {
        if let Err(e) = self.store_history_entry(entry).await {
            warn!(
                "Failed to cache disease history '{}' for patient '{}': {}",
                entry.id, entry.patient_id, e
            );
        }
    }

    /// Deletes keys. Failures are logged.
    pub async fn invalidate(&self, keys: &[String]) {
        for key in keys {
            match self.cache.delete(key).await {
                Ok(_) => debug!("Invalidated cache key '{}'", key),
                Err(e) => warn!("Failed to invalidate cache key '{}': {}", key, e),
            }
        }
    }

    /// Deletes every key matching each pattern. Failures are logged.
    pub async fn invalidate_patterns(&self, patterns: &[&str]) {
        for pattern in patterns {
            match self.cache.delete_pattern(pattern).await {
                Ok(count) => debug!("Invalidated {} cache keys matching '{}'", count, pattern),
                Err(e) => warn!("Failed to invalidate cache keys matching '{}': {}", pattern, e),
            }
        }
    }
}

impl std::fmt::Debug for CacheAside<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside")
            .field("enabled", &self.cache.is_enabled())
            .field("ttls", &self.ttls)
            .finish()
    }
}
