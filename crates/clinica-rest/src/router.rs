//! Main application router.

use crate::{
    controllers::{disease_history_controller, health_controller, patient_controller},
    middleware::logging_middleware,
    state::AppState,
};
use axum::{middleware, routing::get, Router};
use clinica_config::ServerConfig;
use clinica_core::HealthCheck;
use clinica_service::{DiseaseHistoryService, PatientService, PendingTestService, PresenceService};
use shaku::{HasComponent, Module};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the main application router from a Shaku module.
///
/// The module must provide the four Clinica services. Health checks are
/// passed separately because they wrap the module's infrastructure
/// components rather than its services.
pub fn create_router<M>(
    module: &M,
    server_config: &ServerConfig,
    health_checks: Vec<Arc<dyn HealthCheck>>,
) -> Router
where
    M: Module
        + HasComponent<dyn PatientService>
        + HasComponent<dyn DiseaseHistoryService>
        + HasComponent<dyn PresenceService>
        + HasComponent<dyn PendingTestService>,
{
    let state = AppState::from_module(module).with_health_checks(health_checks);
    create_router_with_state(state, server_config)
}

/// Creates the main application router from prepared state.
pub fn create_router_with_state(state: AppState, server_config: &ServerConfig) -> Router {
    let api_router = Router::new()
        .nest("/patients", patient_controller::router())
        .nest("/disease-history", disease_history_controller::router());

    let router = Router::new()
        .merge(health_controller::router())
        .nest("/api/v1", api_router)
        .route("/", get(root))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server_config.request_timeout_secs.max(1),
        )))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with patient and disease-history endpoints");
    router
}

/// Root endpoint handler.
async fn root() -> &'static str {
    "Clinica API v1"
}
