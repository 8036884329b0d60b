//! Database connection pool management.

use clinica_config::DatabaseConfig;
use clinica_core::{ClinicaError, ClinicaResult, Interface};
use async_trait::async_trait;
use shaku::Component;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

/// Interface for database pool operations.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns the underlying PostgreSQL pool.
    fn inner(&self) -> ClinicaResult<&PgPool>;

    /// Checks if the database connection is healthy.
    async fn health_check(&self) -> ClinicaResult<()>;

    /// Runs database migrations.
    async fn run_migrations(&self) -> ClinicaResult<()>;

    /// Closes the database pool.
    async fn close(&self);
}

/// Database pool wrapper.
///
/// The pool is optional so the component can be built with default
/// parameters; every query against an unset pool fails with `Database`.
#[derive(Component)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    pool: Option<PgPool>,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> ClinicaResult<Self> {
        info!("Connecting to PostgreSQL database...");

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                ClinicaError::Database(format!("Failed to connect: {}", e))
            })?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool: Some(pool) })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Returns a clone of the pool handle, for module parameters.
    #[must_use]
    pub fn handle(&self) -> Option<PgPool> {
        self.pool.clone()
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> ClinicaResult<&PgPool> {
        self.pool
            .as_ref()
            .ok_or_else(|| ClinicaError::Database("Database pool not initialized".to_string()))
    }

    async fn health_check(&self) -> ClinicaResult<()> {
        sqlx::query("SELECT 1")
            .execute(self.inner()?)
            .await
            .map_err(|e| ClinicaError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn run_migrations(&self) -> ClinicaResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(self.inner()?)
            .await
            .map_err(|e| ClinicaError::Database(format!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn close(&self) {
        if let Some(pool) = &self.pool {
            info!("Closing database connection pool...");
            pool.close().await;
            info!("Database connection pool closed");
        }
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pool {
            Some(pool) => f
                .debug_struct("DatabasePool")
                .field("size", &pool.size())
                .field("num_idle", &pool.num_idle())
                .finish(),
            None => f.debug_struct("DatabasePool").field("pool", &"unset").finish(),
        }
    }
}
