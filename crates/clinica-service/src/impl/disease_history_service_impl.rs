//! Disease-history service implementation.

use super::{require_history_id, require_patient_id};
use crate::cache::{cache_keys, CacheStore, CacheTtls};
use crate::coordinator::CacheAside;
use crate::disease_history_service::DiseaseHistoryService;
use crate::dto::{AddHistoryRequest, UpdateHistoryRequest};
use clinica_core::{
    ClinicaError, ClinicaResult, DiseaseHistory, DiseaseHistoryFilter, HistoryId, PatientId,
    ValidateExt,
};
use clinica_repository::PatientRepository;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

/// Disease-history service component for Shaku DI.
///
/// Entries live inside their owner's document. Each one is cached as the
/// hash `diseaseHistory:{patientId}:{historyId}`; list results are cached
/// under `diseaseHistory:{id}:{patientId}`. A mutation drops every
/// `diseaseHistory:*` key along with the owner's patient blob and all patient
/// lists, since those embed the history array.
#[derive(Component)]
#[shaku(interface = DiseaseHistoryService)]
pub struct DiseaseHistoryServiceComponent {
    #[shaku(inject)]
    repository: Arc<dyn PatientRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl DiseaseHistoryServiceComponent {
    /// Creates a disease-history service outside a shaku module.
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

    async fn invalidate_owner_views(&self, owner: &PatientId) {
        let aside = self.cache_aside();
        aside.invalidate(&[cache_keys::patient(owner)]).await;
        aside
            .invalidate_patterns(&[
                cache_keys::history_pattern(),
                cache_keys::patient_lists_pattern(),
            ])
            .await;
    }

    async fn load_entry(
        &self,
        id: &HistoryId,
        patient_id: &PatientId,
    ) -> ClinicaResult<Option<DiseaseHistory>> {
        Ok(self
            .repository
            .find_by_id(patient_id)
            .await?
            .and_then(|patient| patient.history_entry(id).cloned()))
    }
}

#[async_trait]
impl DiseaseHistoryService for DiseaseHistoryServiceComponent {
    async fn add_history(&self, request: AddHistoryRequest) -> ClinicaResult<DiseaseHistory> {
        debug!("Adding disease history {} to patient {}", request.id, request.patient_id);

        request.validate_request()?;
        let entry = request.into_entry();

        if self.repository.history_exists(&entry.id).await? {
            return Err(ClinicaError::conflict("History ID already exists"));
        }

        if !self.repository.push_history(&entry).await? {
            return Err(ClinicaError::not_found("Patient", &entry.patient_id));
        }

        self.invalidate_owner_views(&entry.patient_id).await;
        self.cache_aside().populate_history_entry(&entry).await;

        info!("Disease history added: {} (patient {})", entry.id, entry.patient_id);
        Ok(entry)
    }

    async fn get_history_entry(
        &self,
        id: &HistoryId,
        patient_id: Option<&PatientId>,
    ) -> ClinicaResult<DiseaseHistory> {
        debug!("Getting disease history: {} (patient {:?})", id, patient_id);

        require_history_id(id)?;

        let entry = match patient_id {
            Some(owner) => {
                require_patient_id(owner)?;
                self.cache_aside()
                    .read_history_entry(owner, id, || self.load_entry(id, owner))
                    .await?
            }
            // Without the owner there is no key to consult
            None => {
                let entry = self
                    .repository
                    .find_by_history_id(id)
                    .await?
                    .and_then(|patient| patient.history_entry(id).cloned());
                if let Some(entry) = &entry {
                    self.cache_aside().populate_history_entry(entry).await;
                }
                entry
            }
        };

        entry.ok_or_else(|| ClinicaError::not_found("DiseaseHistory", id))
    }

    async fn list_history(&self, filter: DiseaseHistoryFilter) -> ClinicaResult<Vec<DiseaseHistory>> {
        debug!(
            "Listing disease history, id: {:?}, patient: {:?}",
            filter.history_id(),
            filter.patient_id()
        );

        self.cache_aside()
            .read_list(&cache_keys::history_list(&filter), || {
                self.repository.find_history(&filter)
            })
            .await
    }

    async fn update_history(&self, id: &HistoryId, request: UpdateHistoryRequest) -> ClinicaResult<DiseaseHistory> {
        debug!("Updating disease history: {}", id);

        require_history_id(id)?;
        request.validate_request()?;

        let owner = request.owner();
        let updated = self
            .repository
            .set_history_name(id, owner.as_ref(), &request.diseases_name)
            .await?
            .ok_or_else(|| ClinicaError::not_found("DiseaseHistory", id))?;

        self.invalidate_owner_views(&updated.patient_id).await;
        self.cache_aside().populate_history_entry(&updated).await;

        info!("Disease history updated: {} (patient {})", id, updated.patient_id);
        Ok(updated)
    }

    async fn delete_history(&self, id: &HistoryId) -> ClinicaResult<()> {
        debug!("Deleting disease history: {}", id);

        require_history_id(id)?;

        let owner = self
            .repository
            .pull_history(id)
            .await?
            .ok_or_else(|| ClinicaError::not_found("DiseaseHistory", id))?;

        self.cache_aside()
            .invalidate(&[cache_keys::history_entry(&owner, id)])
            .await;
        self.invalidate_owner_views(&owner).await;

        info!("Disease history deleted: {} (patient {})", id, owner);
        Ok(())
    }

    async fn warm_patient_history(&self, patient_id: &PatientId) -> ClinicaResult<usize> {
        debug!("Caching disease history for patient: {}", patient_id);

        require_patient_id(patient_id)?;
        if !self.cache.is_enabled() {
            return Err(ClinicaError::Cache("Cache is disabled".to_string()));
        }

        let patient = self
            .repository
            .find_by_id(patient_id)
            .await?
            .ok_or_else(|| ClinicaError::not_found("Patient", patient_id))?;

        let aside = self.cache_aside();
        for entry in &patient.disease_history {
            aside.store_history_entry(entry).await?;
        }

        info!(
            "Cached {} disease history entries for patient {}",
            patient.disease_history.len(),
            patient_id
        );
        Ok(patient.disease_history.len())
    }
}

impl std::fmt::Debug for DiseaseHistoryServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiseaseHistoryServiceComponent").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStoreExt, MockCacheStore, RedisCacheStore};
    use crate::patient_service::PatientService;
    use crate::r#impl::test_support::{create_request, initial_entry, Fixture};
    use crate::r#impl::PatientServiceComponent;
    use clinica_core::{Patient, PatientFilter};
    use std::time::Duration;

    fn services(fixture: &Fixture) -> (PatientServiceComponent, DiseaseHistoryServiceComponent) {
        (
            PatientServiceComponent::new(fixture.repository.clone(), fixture.cache.clone(), fixture.ttls),
            DiseaseHistoryServiceComponent::new(fixture.repository.clone(), fixture.cache.clone(), fixture.ttls),
        )
    }

    fn add(id: &str, patient_id: &str, name: &str) -> AddHistoryRequest {
        AddHistoryRequest {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            diseases_name: name.to_string(),
        }
    }

    fn by_patient(patient_id: &str) -> DiseaseHistoryFilter {
        DiseaseHistoryFilter::new(None, Some(patient_id.to_string()))
    }

    async fn seeded() -> (Fixture, PatientServiceComponent, DiseaseHistoryServiceComponent) {
        let fixture = Fixture::new();
        let (patients, history) = services(&fixture);
        patients.create_patient(create_request("000002", "555-1234")).await.unwrap();
        (fixture, patients, history)
    }

    #[tokio::test]
    async fn test_add_and_delete_scenario() {
        let (_fixture, _patients, history) = seeded().await;

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();

        let entries = history.list_history(by_patient("000002")).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].diseases_name, "Flu");

        history.delete_history(&HistoryId::new("h1")).await.unwrap();
        assert!(history.list_history(by_patient("000002")).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_populates_entry_hash() {
        let (fixture, _patients, history) = seeded().await;

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();

        let fields = fixture.cache.hash_get("diseaseHistory:000002:h1").await.unwrap();
        assert_eq!(fields.get("diseases_name").map(String::as_str), Some("Flu"));
        assert_eq!(fields.get("patient_id").map(String::as_str), Some("000002"));
        assert_eq!(fixture.cache.ttl("diseaseHistory:000002:h1"), Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_id_and_missing_owner() {
        let (fixture, _patients, history) = seeded().await;

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();

        let result = history.add_history(add("h1", "000002", "Cold")).await;
        assert!(matches!(result, Err(ClinicaError::Conflict(_))));

        let result = history.add_history(add("h2", "missing", "Cold")).await;
        assert!(matches!(result, Err(ClinicaError::NotFound { .. })));
        assert!(!fixture.cache.contains("diseaseHistory:missing:h2"));

        let result = history.add_history(add("", "000002", "Cold")).await;
        assert!(matches!(result, Err(ClinicaError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mutation_refreshes_embedded_views() {
        let (_fixture, patients, history) = seeded().await;
        let id = PatientId::new("000002");

        // Cache the patient blob and a list before the history changes
        assert!(patients.get_patient(&id).await.unwrap().disease_history.is_empty());
        patients.list_patients(PatientFilter::default()).await.unwrap();

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();

        let patient = patients.get_patient(&id).await.unwrap();
        assert_eq!(patient.disease_history.len(), 1);
        let listed = patients.list_patients(PatientFilter::default()).await.unwrap();
        assert_eq!(listed[0].disease_history.len(), 1);

        history.delete_history(&HistoryId::new("h1")).await.unwrap();
        assert!(patients.get_patient(&id).await.unwrap().disease_history.is_empty());
    }

    #[tokio::test]
    async fn test_get_entry_with_and_without_owner() {
        let (fixture, _patients, history) = seeded().await;
        let hid = HistoryId::new("h1");
        let pid = PatientId::new("000002");

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();
        fixture.cache.delete("diseaseHistory:000002:h1").await.unwrap();

        let entry = history.get_history_entry(&hid, Some(&pid)).await.unwrap();
        assert_eq!(entry.diseases_name, "Flu");
        assert!(fixture.cache.contains("diseaseHistory:000002:h1"));

        fixture.cache.delete("diseaseHistory:000002:h1").await.unwrap();
        let entry = history.get_history_entry(&hid, None).await.unwrap();
        assert_eq!(entry.patient_id, pid);
        assert!(fixture.cache.contains("diseaseHistory:000002:h1"));

        let result = history
            .get_history_entry(&hid, Some(&PatientId::new("000003")))
            .await;
        assert!(matches!(result, Err(ClinicaError::NotFound { .. })));
        let result = history.get_history_entry(&HistoryId::new("h9"), None).await;
        assert!(matches!(result, Err(ClinicaError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_renames_and_repopulates() {
        let (fixture, _patients, history) = seeded().await;
        let hid = HistoryId::new("h1");

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();
        history.list_history(DiseaseHistoryFilter::default()).await.unwrap();

        let request = UpdateHistoryRequest {
            patient_id: Some("000002".to_string()),
            diseases_name: "Influenza".to_string(),
        };
        let updated = history.update_history(&hid, request).await.unwrap();
        assert_eq!(updated.diseases_name, "Influenza");

        let entry = history
            .get_history_entry(&hid, Some(&PatientId::new("000002")))
            .await
            .unwrap();
        assert_eq!(entry.diseases_name, "Influenza");

        let all = history.list_history(DiseaseHistoryFilter::default()).await.unwrap();
        assert_eq!(all[0].diseases_name, "Influenza");

        let request = UpdateHistoryRequest {
            patient_id: Some("000003".to_string()),
            diseases_name: "Cold".to_string(),
        };
        let result = history.update_history(&hid, request).await;
        assert!(matches!(result, Err(ClinicaError::NotFound { .. })));
        assert!(fixture.cache.contains("diseaseHistory:000002:h1"));
    }

    #[tokio::test]
    async fn test_delete_missing_entry_is_not_found() {
        let (_fixture, _patients, history) = seeded().await;
        let result = history.delete_history(&HistoryId::new("h1")).await;
        assert!(matches!(result, Err(ClinicaError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_filters_are_exact() {
        let (_fixture, patients, history) = seeded().await;
        patients.create_patient(create_request("000003", "1")).await.unwrap();

        history.add_history(add("h1", "000002", "Flu")).await.unwrap();
        history.add_history(add("h10", "000003", "Cold")).await.unwrap();

        let exact = history
            .list_history(DiseaseHistoryFilter::new(Some("h1".to_string()), None))
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].patient_id.as_str(), "000002");

        let all = history.list_history(DiseaseHistoryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_warm_patient_history() {
        let fixture = Fixture::new();
        let (patients, history) = services(&fixture);

        let mut request = create_request("000002", "1");
        request.disease_history = vec![initial_entry("h1", "Flu"), initial_entry("h2", "Cold")];
        patients.create_patient(request).await.unwrap();
        fixture.cache.delete_pattern("diseaseHistory:*").await.unwrap();

        let cached = history.warm_patient_history(&PatientId::new("000002")).await.unwrap();
        assert_eq!(cached, 2);
        assert!(fixture.cache.contains("diseaseHistory:000002:h1"));
        assert!(fixture.cache.contains("diseaseHistory:000002:h2"));

        let result = history.warm_patient_history(&PatientId::new("missing")).await;
        assert!(matches!(result, Err(ClinicaError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_warm_reports_cache_outage() {
        let fixture = Fixture::new();
        let mut patient = Patient::new(PatientId::new("000002"));
        patient
            .disease_history
            .push(DiseaseHistory::new(HistoryId::new("h1"), patient.id.clone(), "Flu"));
        fixture.repository.insert(&patient).await.unwrap();

        let mut cache = MockCacheStore::new();
        cache.expect_is_enabled().return_const(true);
        cache
            .expect_hash_set()
            .returning(|_, _, _| Err(ClinicaError::Cache("connection refused".to_string())));
        let history =
            DiseaseHistoryServiceComponent::new(fixture.repository.clone(), Arc::new(cache), fixture.ttls);

        let err = history.warm_patient_history(&patient.id).await.unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn test_warm_with_cache_disabled_is_an_error() {
        let fixture = Fixture::new();
        let mut request = create_request("000002", "1");
        request.disease_history = vec![initial_entry("h1", "Flu")];
        PatientServiceComponent::new(fixture.repository.clone(), fixture.cache.clone(), fixture.ttls)
            .create_patient(request)
            .await
            .unwrap();

        let history = DiseaseHistoryServiceComponent::new(
            fixture.repository.clone(),
            Arc::new(RedisCacheStore::disabled()),
            fixture.ttls,
        );

        let err = history.warm_patient_history(&PatientId::new("000002")).await.unwrap_err();
        assert!(matches!(err, ClinicaError::Cache(_)));
    }

    #[tokio::test]
    async fn test_list_key_holding_a_hash_is_rebuilt() {
        let (fixture, _patients, history) = seeded().await;
        history.add_history(add("h1", "000002", "Flu")).await.unwrap();

        // An entry hash whose IDs spell out a list key
        fixture
            .cache
            .hash_set(
                "diseaseHistory::000002",
                &[("diseases_name".to_string(), "X".to_string())],
                Duration::from_secs(300),
            )
            .await
            .unwrap();

        let entries = history.list_history(by_patient("000002")).await.unwrap();
        assert_eq!(entries.len(), 1);
        let cached: Option<Vec<DiseaseHistory>> = fixture.cache.get("diseaseHistory::000002").await.unwrap();
        assert_eq!(cached, Some(entries));
    }
}
