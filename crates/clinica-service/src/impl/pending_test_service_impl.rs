//! Pending-test queue implementation.

use super::require_patient_id;
use crate::cache::{cache_keys, CacheStore};
use crate::pending_test_service::PendingTestService;
use clinica_core::{ClinicaError, ClinicaResult, PatientId};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pending-test queue component for Shaku DI.
///
/// Queues have no expiry. They are cleared when their patient is deleted.
#[derive(Component)]
#[shaku(interface = PendingTestService)]
pub struct PendingTestServiceComponent {
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
}

impl PendingTestServiceComponent {
    /// Creates a pending-test service outside a shaku module.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    fn ensure_enabled(&self) -> ClinicaResult<()> {
        if !self.cache.is_enabled() {
            return Err(ClinicaError::Cache("Cache is disabled".to_string()));
        }
        Ok(())
    }

    async fn discard_corrupt(&self, key: &str, err: &ClinicaError) -> ClinicaResult<()> {
        warn!("Discarding corrupt pending-test queue '{}': {}", key, err);
        self.cache.delete(key).await?;
        Ok(())
    }
}

#[async_trait]
impl PendingTestService for PendingTestServiceComponent {
    async fn add_pending_test(&self, patient_id: &PatientId, test_name: &str) -> ClinicaResult<u64> {
        debug!("Adding pending test for patient {}: {}", patient_id, test_name);

        require_patient_id(patient_id)?;
        if test_name.trim().is_empty() {
            return Err(ClinicaError::validation("Test name is required"));
        }
        self.ensure_enabled()?;

        let key = cache_keys::pending_tests(patient_id);
        let len = match self.cache.list_push(&key, test_name).await {
            Err(e) if e.is_corrupt_entry() => {
                self.discard_corrupt(&key, &e).await?;
                self.cache.list_push(&key, test_name).await?
            }
            other => other?,
        };

        info!("Added pending test \"{}\" for patient {}", test_name, patient_id);
        Ok(len)
    }

    async fn get_pending_tests(&self, patient_id: &PatientId) -> ClinicaResult<Vec<String>> {
        debug!("Getting pending tests for patient: {}", patient_id);

        require_patient_id(patient_id)?;
        self.ensure_enabled()?;

        let key = cache_keys::pending_tests(patient_id);
        match self.cache.list_range(&key, 0, -1).await {
            Err(e) if e.is_corrupt_entry() => {
                self.discard_corrupt(&key, &e).await?;
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for PendingTestServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTestServiceComponent").finish_non_exhaustive()
    }
}
