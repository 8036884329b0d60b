//! Patient service implementation.

use super::require_patient_id;
use crate::cache::{cache_keys, CacheStore, CacheTtls};
use crate::coordinator::CacheAside;
use crate::dto::{CreatePatientRequest, UpdatePatientRequest};
use crate::patient_service::PatientService;
use clinica_core::{
    ClinicaError, ClinicaResult, Patient, PatientChanges, PatientFilter, PatientId, ValidateExt,
};
use clinica_repository::PatientRepository;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

/// Patient service component for Shaku DI.
///
/// Reads go through `patient:{id}` and `patients:{id}:{phone}`. Every
/// successful write refreshes or drops the single-patient key and drops all
/// patient list keys.
#[derive(Component)]
#[shaku(interface = PatientService)]
pub struct PatientServiceComponent {
    #[shaku(inject)]
    repository: Arc<dyn PatientRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl PatientServiceComponent {
    /// Creates a patient service outside a shaku module.
    #[must_use]
    pub fn new(repository: Arc<dyn PatientRepository>, cache: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self {
            repository,
            cache,
            ttls,
        }
    }

    fn cache_aside(&self) -> CacheAside<'_> {
        CacheAside::new(self.cache.as_ref(), self.ttls)
    }

    async fn ensure_history_ids_unused(&self, request: &CreatePatientRequest) -> ClinicaResult<()> {
        if let Some(repeated) = request.duplicate_history_id() {
            return Err(ClinicaError::validation(format!(
                "History ID '{}' appears more than once",
                repeated
            )));
        }

        for history_id in request.history_ids() {
            if self.repository.history_exists(&history_id).await? {
                return Err(ClinicaError::conflict("History ID already exists"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PatientService for PatientServiceComponent {
    async fn create_patient(&self, request: CreatePatientRequest) -> ClinicaResult<Patient> {
        debug!("Creating patient: {}", request.patient_id);

        request.validate_request()?;
        self.ensure_history_ids_unused(&request).await?;

        // Uniqueness is decided by the store, never by the cache
        let id = PatientId::new(request.patient_id.clone());
        if self.repository.exists(&id).await? {
            return Err(ClinicaError::conflict("Patient ID already exists"));
        }

        let saved = self.repository.insert(&request.into_patient()).await?;

        let aside = self.cache_aside();
        aside.populate(&cache_keys::patient(&saved.id), &saved).await;
        aside
            .invalidate_patterns(&[cache_keys::patient_lists_pattern()])
            .await;

        if !saved.disease_history.is_empty() {
            aside.invalidate_patterns(&[cache_keys::history_pattern()]).await;
            for entry in &saved.disease_history {
                aside.populate_history_entry(entry).await;
            }
        }

        info!("Patient created: {}", saved.id);
        Ok(saved)
    }

    async fn get_patient(&self, id: &PatientId) -> ClinicaResult<Patient> {
        debug!("Getting patient: {}", id);

        require_patient_id(id)?;

        self.cache_aside()
            .read_through(&cache_keys::patient(id), || self.repository.find_by_id(id))
            .await?
            .ok_or_else(|| ClinicaError::not_found("Patient", id))
    }

    async fn list_patients(&self, filter: PatientFilter) -> ClinicaResult<Vec<Patient>> {
        debug!("Listing patients, id: {:?}, phone: {:?}", filter.id(), filter.phone());

        self.cache_aside()
            .read_list(&cache_keys::patient_list(&filter), || {
                self.repository.find_all(&filter)
            })
            .await
    }

    async fn update_patient(&self, id: &PatientId, request: UpdatePatientRequest) -> ClinicaResult<Patient> {
        debug!("Updating patient: {}", id);

        require_patient_id(id)?;
        request.validate_request()?;

        let changes = PatientChanges::from(request);
        let updated = self
            .repository
            .update(id, &changes)
            .await?
            .ok_or_else(|| ClinicaError::not_found("Patient", id))?;

        // Refresh rather than drop so the next read cannot see the old value
        let aside = self.cache_aside();
        aside.populate(&cache_keys::patient(id), &updated).await;
        aside
            .invalidate_patterns(&[cache_keys::patient_lists_pattern()])
            .await;

        info!("Patient updated: {}", id);
        Ok(updated)
    }

    async fn delete_patient(&self, id: &PatientId) -> ClinicaResult<()> {
        debug!("Deleting patient: {}", id);

        require_patient_id(id)?;

        if !self.repository.delete(id).await? {
            return Err(ClinicaError::not_found("Patient", id));
        }

        let aside = self.cache_aside();
        aside
            .invalidate(&[cache_keys::patient(id), cache_keys::pending_tests(id)])
            .await;
        aside
            .invalidate_patterns(&[
                cache_keys::patient_lists_pattern(),
                cache_keys::history_pattern(),
            ])
            .await;

        info!("Patient deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for PatientServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientServiceComponent").finish_non_exhaustive()
    }
}
