//! Readiness checks for the two backing stores.

use crate::cache::CacheStore;
use clinica_core::{HealthCheck, HealthStatus};
use clinica_repository::PatientRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// Pings the document store.
pub struct DocumentStoreHealthCheck {
    repository: Arc<dyn PatientRepository>,
}

impl DocumentStoreHealthCheck {
    #[must_use]
    pub fn new(repository: Arc<dyn PatientRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl HealthCheck for DocumentStoreHealthCheck {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthStatus {
        match self.repository.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

/// Pings the cache store. A disabled cache is reported as degraded.
pub struct CacheStoreHealthCheck {
    cache: Arc<dyn CacheStore>,
}

impl CacheStoreHealthCheck {
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl HealthCheck for CacheStoreHealthCheck {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthStatus {
        if !self.cache.is_enabled() {
            return HealthStatus::Degraded("cache disabled".to_string());
        }
        match self.cache.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}
