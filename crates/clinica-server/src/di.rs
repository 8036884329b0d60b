//! Dependency injection module using Shaku.
//!
//! Two modules cover the supported document stores:
//! - `PostgresModule`: PostgreSQL-backed repository
//! - `InMemoryModule`: process-local repository, for development and tests
//!
//! Both declare `RedisCacheStore` as the cache component. A disabled cache is
//! a `RedisCacheStore` without a pool, and the process-local cache replaces
//! the component through a module override.

use clinica_config::{AppConfig, CacheBackend, CacheConfig, RedisConfig};
use clinica_core::{module, ClinicaError, ClinicaResult, HasComponent, HealthCheck};
use clinica_repository::{
    DatabasePool, DatabasePoolInterface, DatabasePoolParameters, InMemoryPatientRepository,
    PatientRepository, PostgresPatientRepository,
};
use clinica_service::{
    CacheStore, CacheStoreHealthCheck, CacheTtls, DiseaseHistoryService,
    DiseaseHistoryServiceComponent, DiseaseHistoryServiceComponentParameters,
    DocumentStoreHealthCheck, InMemoryCacheStore, PatientService, PatientServiceComponent,
    PatientServiceComponentParameters, PendingTestService, PendingTestServiceComponent,
    PresenceService, PresenceServiceComponent, PresenceServiceComponentParameters,
    RedisCacheStore, RedisCacheStoreParameters,
};
use deadpool_redis::{Pool, PoolConfig, Runtime};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Shaku Module Definitions
// ============================================================================

// PostgreSQL document store with a shared cache.
module! {
    pub PostgresModule {
        components = [
            DatabasePool,
            PostgresPatientRepository,
            RedisCacheStore,
            PatientServiceComponent,
            DiseaseHistoryServiceComponent,
            PresenceServiceComponent,
            PendingTestServiceComponent,
        ],
        providers = [],
    }
}

// Process-local document store.
module! {
    pub InMemoryModule {
        components = [
            InMemoryPatientRepository,
            RedisCacheStore,
            PatientServiceComponent,
            DiseaseHistoryServiceComponent,
            PresenceServiceComponent,
            PendingTestServiceComponent,
        ],
        providers = [],
    }
}

// ============================================================================
// Module Builders
// ============================================================================

/// Creates the Redis pool, or `None` when the Redis cache is not selected.
pub fn create_redis_pool(redis: &RedisConfig, cache: &CacheConfig) -> ClinicaResult<Option<Arc<Pool>>> {
    if !cache.uses_redis() || !redis.enabled {
        return Ok(None);
    }

    let mut cfg = deadpool_redis::Config::from_url(&redis.url);
    cfg.pool = Some(PoolConfig::new(redis.pool_size.max(1) as usize));
    let pool = cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| ClinicaError::Cache(format!("Failed to create Redis pool: {}", e)))?;

    info!("Redis pool created for {}", redis.url);
    Ok(Some(Arc::new(pool)))
}

/// Returns the cache component to install in place of `RedisCacheStore`.
fn cache_override(cache: &CacheConfig) -> Option<Box<dyn CacheStore>> {
    match cache.backend {
        CacheBackend::Memory => {
            info!("Using in-process cache store");
            Some(Box::new(InMemoryCacheStore::new()))
        }
        CacheBackend::Redis | CacheBackend::Disabled => None,
    }
}

fn log_cache_mode(cache: &CacheConfig, pool: &Option<Arc<Pool>>) {
    match (cache.backend, pool) {
        (CacheBackend::Redis, Some(_)) => info!("Using Redis cache store"),
        (CacheBackend::Memory, _) => {}
        _ => info!("Caching disabled; reads go straight to the document store"),
    }
}

/// Builds the PostgreSQL-backed module.
///
/// Connects to the database; migrations are left to the caller.
pub async fn build_postgres_module(config: &AppConfig) -> ClinicaResult<Arc<PostgresModule>> {
    let db_pool = DatabasePool::connect(&config.database).await?;
    let cache_pool = create_redis_pool(&config.redis, &config.cache)?;
    log_cache_mode(&config.cache, &cache_pool);
    let ttls = CacheTtls::from(&config.cache);

    let mut builder = PostgresModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: db_pool.handle(),
        })
        .with_component_parameters::<RedisCacheStore>(RedisCacheStoreParameters { pool: cache_pool })
        .with_component_parameters::<PatientServiceComponent>(PatientServiceComponentParameters { ttls })
        .with_component_parameters::<DiseaseHistoryServiceComponent>(
            DiseaseHistoryServiceComponentParameters { ttls },
        )
        .with_component_parameters::<PresenceServiceComponent>(PresenceServiceComponentParameters { ttls });

    if let Some(cache) = cache_override(&config.cache) {
        builder = builder.with_component_override::<dyn CacheStore>(cache);
    }

    Ok(Arc::new(builder.build()))
}

/// Builds the in-memory module.
pub fn build_in_memory_module(config: &AppConfig) -> ClinicaResult<Arc<InMemoryModule>> {
    let cache_pool = create_redis_pool(&config.redis, &config.cache)?;
    log_cache_mode(&config.cache, &cache_pool);
    let ttls = CacheTtls::from(&config.cache);

    let mut builder = InMemoryModule::builder()
        .with_component_parameters::<RedisCacheStore>(RedisCacheStoreParameters { pool: cache_pool })
        .with_component_parameters::<PatientServiceComponent>(PatientServiceComponentParameters { ttls })
        .with_component_parameters::<DiseaseHistoryServiceComponent>(
            DiseaseHistoryServiceComponentParameters { ttls },
        )
        .with_component_parameters::<PresenceServiceComponent>(PresenceServiceComponentParameters { ttls });

    if let Some(cache) = cache_override(&config.cache) {
        builder = builder.with_component_override::<dyn CacheStore>(cache);
    }

    Ok(Arc::new(builder.build()))
}

// ============================================================================
// Resolvers
// ============================================================================

/// Resolves the infrastructure components behind the readiness checks.
pub trait InfrastructureResolver {
    /// Resolves the patient repository.
    fn patient_repository(&self) -> Arc<dyn PatientRepository>;

    /// Resolves the cache store.
    fn cache_store(&self) -> Arc<dyn CacheStore>;

    /// Builds one health check per backing service.
    fn health_checks(&self) -> Vec<Arc<dyn HealthCheck>> {
        vec![
            Arc::new(DocumentStoreHealthCheck::new(self.patient_repository())),
            Arc::new(CacheStoreHealthCheck::new(self.cache_store())),
        ]
    }
}

impl<M> InfrastructureResolver for M
where
    M: HasComponent<dyn PatientRepository> + HasComponent<dyn CacheStore>,
{
    fn patient_repository(&self) -> Arc<dyn PatientRepository> {
        HasComponent::<dyn PatientRepository>::resolve(self)
    }

    fn cache_store(&self) -> Arc<dyn CacheStore> {
        HasComponent::<dyn CacheStore>::resolve(self)
    }
}

/// Trait for resolving services from a module.
pub trait ServiceResolver {
    fn patient_service(&self) -> Arc<dyn PatientService>;
    fn disease_history_service(&self) -> Arc<dyn DiseaseHistoryService>;
    fn presence_service(&self) -> Arc<dyn PresenceService>;
    fn pending_test_service(&self) -> Arc<dyn PendingTestService>;
}

impl<M> ServiceResolver for M
where
    M: HasComponent<dyn PatientService>
        + HasComponent<dyn DiseaseHistoryService>
        + HasComponent<dyn PresenceService>
        + HasComponent<dyn PendingTestService>,
{
    fn patient_service(&self) -> Arc<dyn PatientService> {
        HasComponent::<dyn PatientService>::resolve(self)
    }

    fn disease_history_service(&self) -> Arc<dyn DiseaseHistoryService> {
        HasComponent::<dyn DiseaseHistoryService>::resolve(self)
    }

    fn presence_service(&self) -> Arc<dyn PresenceService> {
        HasComponent::<dyn PresenceService>::resolve(self)
    }

    fn pending_test_service(&self) -> Arc<dyn PendingTestService> {
        HasComponent::<dyn PendingTestService>::resolve(self)
    }
}

/// Resolves the database pool for migrations and shutdown.
pub trait DatabaseResolver {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl DatabaseResolver for PostgresModule {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        HasComponent::<dyn DatabasePoolInterface>::resolve(self)
    }
}
