//! # Clinica Server
//!
//! Main entry point for the Clinica patient-record backend.

use clinica_config::{AppConfig, ConfigLoader, DatabaseBackend};
use clinica_core::telemetry::init_logging;
use clinica_core::{ClinicaError, ClinicaResult, HasComponent};
use clinica_repository::DatabasePoolInterface;
use clinica_rest::create_router;
use clinica_server::di::{
    build_in_memory_module, build_postgres_module, DatabaseResolver, InfrastructureResolver,
};
use clinica_server::startup::{print_banner, print_startup_info};
use clinica_service::{DiseaseHistoryService, PatientService, PendingTestService, PresenceService};
use shaku::Module;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.observability.logging());
    print_banner();

    info!("Starting Clinica Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> ClinicaResult<()> {
    match config.database.backend {
        DatabaseBackend::Postgres => {
            let module = build_postgres_module(&config).await?;
            let pool = module.database_pool();
            if config.database.run_migrations {
                pool.run_migrations().await?;
            }
            let result = serve(module.as_ref(), &config).await;
            pool.close().await;
            result
        }
        DatabaseBackend::Memory => {
            warn!("Using in-memory document store; data is lost on shutdown");
            let module = build_in_memory_module(&config)?;
            serve(module.as_ref(), &config).await
        }
    }
}

async fn serve<M>(module: &M, config: &AppConfig) -> ClinicaResult<()>
where
    M: Module
        + HasComponent<dyn PatientService>
        + HasComponent<dyn DiseaseHistoryService>
        + HasComponent<dyn PresenceService>
        + HasComponent<dyn PendingTestService>
        + InfrastructureResolver,
{
    let router = create_router(module, &config.server, module.health_checks());

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ClinicaError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    print_startup_info(config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ClinicaError::Internal(format!("REST server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
