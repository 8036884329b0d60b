//! In-memory patient repository.

use crate::traits::PatientRepository;
use clinica_core::{
    ClinicaError, ClinicaResult, DiseaseHistory, DiseaseHistoryFilter, HistoryId, Patient,
    PatientChanges, PatientFilter, PatientId,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shaku::Component;
use std::collections::BTreeMap;
use tracing::debug;

/// Patient documents keyed by ID.
pub type PatientDocuments = RwLock<BTreeMap<PatientId, Patient>>;

/// In-memory document store with the same observable behaviour as the
/// PostgreSQL repository, including ID ordering of list results.
#[derive(Component, Default)]
#[shaku(interface = PatientRepository)]
pub struct InMemoryPatientRepository {
    #[shaku(default)]
    patients: PatientDocuments,
}

impl InMemoryPatientRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with patients.
    #[must_use]
    pub fn with_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.patients.write();
            for patient in patients {
                map.insert(patient.id.clone(), patient);
            }
        }
        repo
    }

    /// Number of stored patients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.read().len()
    }

    /// Returns true if no patients are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.read().is_empty()
    }

    fn owner_of(map: &BTreeMap<PatientId, Patient>, history_id: &HistoryId) -> Option<PatientId> {
        map.values()
            .find(|p| p.has_history_entry(history_id))
            .map(|p| p.id.clone())
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> ClinicaResult<Option<Patient>> {
        Ok(self.patients.read().get(id).cloned())
    }

    async fn exists(&self, id: &PatientId) -> ClinicaResult<bool> {
        Ok(self.patients.read().contains_key(id))
    }

    async fn find_all(&self, filter: &PatientFilter) -> ClinicaResult<Vec<Patient>> {
        Ok(self
            .patients
            .read()
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn insert(&self, patient: &Patient) -> ClinicaResult<Patient> {
        let mut map = self.patients.write();
        if map.contains_key(&patient.id) {
            return Err(ClinicaError::conflict("Patient ID already exists"));
        }
        debug!("Inserting patient: {}", patient.id);
        map.insert(patient.id.clone(), patient.clone());
        Ok(patient.clone())
    }

    async fn update(&self, id: &PatientId, changes: &PatientChanges) -> ClinicaResult<Option<Patient>> {
        let mut map = self.patients.write();
        Ok(map.get_mut(id).map(|patient| {
            patient.apply(changes);
            patient.clone()
        }))
    }

    async fn delete(&self, id: &PatientId) -> ClinicaResult<bool> {
        Ok(self.patients.write().remove(id).is_some())
    }

    async fn find_by_history_id(&self, history_id: &HistoryId) -> ClinicaResult<Option<Patient>> {
        Ok(self
            .patients
            .read()
            .values()
            .find(|p| p.has_history_entry(history_id))
            .cloned())
    }

    async fn history_exists(&self, history_id: &HistoryId) -> ClinicaResult<bool> {
        Ok(Self::owner_of(&self.patients.read(), history_id).is_some())
    }

    async fn find_history(&self, filter: &DiseaseHistoryFilter) -> ClinicaResult<Vec<DiseaseHistory>> {
        Ok(filter.select(self.patients.read().values()))
    }

    async fn push_history(&self, entry: &DiseaseHistory) -> ClinicaResult<bool> {
        let mut map = self.patients.write();
        Ok(map
            .get_mut(&entry.patient_id)
            .map(|patient| patient.disease_history.push(entry.clone()))
            .is_some())
    }

    async fn pull_history(&self, history_id: &HistoryId) -> ClinicaResult<Option<PatientId>> {
        let mut map = self.patients.write();
        let Some(owner) = Self::owner_of(&map, history_id) else {
            return Ok(None);
        };
        if let Some(patient) = map.get_mut(&owner) {
            patient.disease_history.retain(|h| &h.id != history_id);
        }
        Ok(Some(owner))
    }

    async fn set_history_name(
        &self,
        history_id: &HistoryId,
        owner: Option<&PatientId>,
        diseases_name: &str,
    ) -> ClinicaResult<Option<DiseaseHistory>> {
        let mut map = self.patients.write();
        let patient = map
            .values_mut()
            .filter(|p| owner.map_or(true, |o| &p.id == o))
            .find(|p| p.has_history_entry(history_id));

        let Some(patient) = patient else {
            return Ok(None);
        };

        let mut updated = None;
        for entry in patient.disease_history.iter_mut().filter(|h| &h.id == history_id) {
            entry.diseases_name = diseases_name.to_string();
            updated.get_or_insert_with(|| entry.clone());
        }
        Ok(updated)
    }

    async fn ping(&self) -> ClinicaResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaku::{module, HasComponent};
    use std::sync::Arc;

    module! {
        RepositoryModule {
            components = [InMemoryPatientRepository],
            providers = [],
        }
    }

    fn patient(id: &str, phone: &str) -> Patient {
        let mut p = Patient::new(PatientId::new(id));
        p.first_name = "Test".to_string();
        p.phone = phone.to_string();
        p
    }

    fn entry(id: &str, patient_id: &str, name: &str) -> DiseaseHistory {
        DiseaseHistory::new(HistoryId::new(id), PatientId::new(patient_id), name)
    }

    #[tokio::test]
    async fn test_builds_from_module_with_default_parameters() {
        let module = RepositoryModule::builder().build();
        let repository: Arc<dyn PatientRepository> = module.resolve();

        repository.insert(&patient("000002", "555-1234")).await.unwrap();
        assert!(repository.exists(&PatientId::new("000002")).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryPatientRepository::new();
        repo.insert(&patient("000002", "555-1234")).await.unwrap();

        let found = repo.find_by_id(&PatientId::new("000002")).await.unwrap();
        assert_eq!(found.map(|p| p.phone), Some("555-1234".to_string()));
        assert!(repo.exists(&PatientId::new("000002")).await.unwrap());
        assert!(!repo.exists(&PatientId::new("000003")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let repo = InMemoryPatientRepository::with_patients([patient("000002", "")]);
        let result = repo.insert(&patient("000002", "other")).await;
        assert!(matches!(result, Err(ClinicaError::Conflict(_))));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_ordered_and_filtered() {
        let repo = InMemoryPatientRepository::with_patients([
            patient("000003", "555-0000"),
            patient("000001", "555-1234"),
            patient("000002", "777-1234"),
        ]);

        let all = repo.find_all(&PatientFilter::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["000001", "000002", "000003"]);

        let by_phone = repo
            .find_all(&PatientFilter::new(None, Some("1234".into())))
            .await
            .unwrap();
        assert_eq!(by_phone.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryPatientRepository::with_patients([patient("000002", "555-1234")]);
        let id = PatientId::new("000002");

        let changes = PatientChanges {
            phone: Some("555-9999".to_string()),
            ..PatientChanges::default()
        };
        let updated = repo.update(&id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.phone, "555-9999");

        assert!(repo.update(&PatientId::new("nope"), &changes).await.unwrap().is_none());
        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.delete(&id).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_history_push_pull_rename() {
        let repo = InMemoryPatientRepository::with_patients([patient("000002", "")]);

        assert!(repo.push_history(&entry("h1", "000002", "Flu")).await.unwrap());
        assert!(repo.push_history(&entry("h2", "000002", "Cold")).await.unwrap());
        assert!(!repo.push_history(&entry("h3", "missing", "Cold")).await.unwrap());
        assert!(repo.history_exists(&HistoryId::new("h1")).await.unwrap());

        let renamed = repo
            .set_history_name(&HistoryId::new("h1"), None, "Influenza")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.diseases_name, "Influenza");

        let wrong_owner = repo
            .set_history_name(&HistoryId::new("h1"), Some(&PatientId::new("other")), "X")
            .await
            .unwrap();
        assert!(wrong_owner.is_none());

        let owner = repo.pull_history(&HistoryId::new("h1")).await.unwrap();
        assert_eq!(owner, Some(PatientId::new("000002")));
        assert!(repo.pull_history(&HistoryId::new("h1")).await.unwrap().is_none());

        let remaining = repo
            .find_history(&DiseaseHistoryFilter::new(None, Some("000002".into())))
            .await
            .unwrap();
        assert_eq!(remaining, vec![entry("h2", "000002", "Cold")]);
    }

    #[tokio::test]
    async fn test_find_by_history_id() {
        let mut p = patient("000002", "");
        p.disease_history.push(entry("h1", "000002", "Flu"));
        let repo = InMemoryPatientRepository::with_patients([p, patient("000003", "")]);

        let owner = repo.find_by_history_id(&HistoryId::new("h1")).await.unwrap();
        assert_eq!(owner.map(|p| p.id), Some(PatientId::new("000002")));
        assert!(repo.find_by_history_id(&HistoryId::new("h9")).await.unwrap().is_none());
    }
}
