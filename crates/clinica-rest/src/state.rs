//! Application state for Axum handlers.

use clinica_core::HealthCheck;
use clinica_service::{DiseaseHistoryService, PatientService, PendingTestService, PresenceService};
use shaku::{HasComponent, Module};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub patient_service: Arc<dyn PatientService>,
    pub disease_history_service: Arc<dyn DiseaseHistoryService>,
    pub presence_service: Arc<dyn PresenceService>,
    pub pending_test_service: Arc<dyn PendingTestService>,
    pub health_checks: Arc<[Arc<dyn HealthCheck>]>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        patient_service: Arc<dyn PatientService>,
        disease_history_service: Arc<dyn DiseaseHistoryService>,
        presence_service: Arc<dyn PresenceService>,
        pending_test_service: Arc<dyn PendingTestService>,
    ) -> Self {
        Self {
            patient_service,
            disease_history_service,
            presence_service,
            pending_test_service,
            health_checks: Arc::from(Vec::new()),
        }
    }

    /// Resolves every service from a shaku module.
    pub fn from_module<M>(module: &M) -> Self
    where
        M: Module
            + HasComponent<dyn PatientService>
            + HasComponent<dyn DiseaseHistoryService>
            + HasComponent<dyn PresenceService>
            + HasComponent<dyn PendingTestService>,
    {
        Self::new(
            module.resolve(),
            module.resolve(),
            module.resolve(),
            module.resolve(),
        )
    }

    /// Sets the checks run by the readiness endpoint.
    #[must_use]
    pub fn with_health_checks(mut self, checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        self.health_checks = Arc::from(checks);
        self
    }
}
