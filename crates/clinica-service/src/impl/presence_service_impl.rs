//! Online-status service implementation.

use super::require_patient_id;
use crate::cache::{cache_keys, CacheStore, CacheTtls};
use crate::presence_service::PresenceService;
use clinica_core::{ClinicaError, ClinicaResult, PatientId};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ONLINE: &str = "true";
const OFFLINE: &str = "false";

/// Presence service component for Shaku DI.
#[derive(Component)]
#[shaku(interface = PresenceService)]
pub struct PresenceServiceComponent {
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl PresenceServiceComponent {
    /// Creates a presence service outside a shaku module.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self { cache, ttls }
    }

    fn ensure_enabled(&self) -> ClinicaResult<()> {
        if !self.cache.is_enabled() {
            return Err(ClinicaError::Cache("Cache is disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PresenceService for PresenceServiceComponent {
    async fn set_online_status(&self, patient_id: &PatientId, online: bool) -> ClinicaResult<()> {
        debug!("Setting online status for patient {}: {}", patient_id, online);

        require_patient_id(patient_id)?;
        self.ensure_enabled()?;

        let value = if online { ONLINE } else { OFFLINE };
        self.cache
            .set_raw(&cache_keys::online_status(patient_id), value, self.ttls.presence)
            .await?;

        info!("Patient {} online status set to {}", patient_id, value);
        Ok(())
    }

    async fn is_online(&self, patient_id: &PatientId) -> ClinicaResult<bool> {
        require_patient_id(patient_id)?;
        self.ensure_enabled()?;

        let key = cache_keys::online_status(patient_id);
        match self.cache.get_raw(&key).await {
            Ok(value) => Ok(value.as_deref() == Some(ONLINE)),
            Err(e) if e.is_corrupt_entry() => {
                warn!("Discarding corrupt presence flag '{}': {}", key, e);
                self.cache.delete(&key).await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for PresenceServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceServiceComponent").finish_non_exhaustive()
    }
}
