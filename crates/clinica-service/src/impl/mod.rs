//! Service implementations.
//!
//! This module contains the concrete shaku components for the service traits.
//! Trait definitions live in the parent module (e.g. `patient_service.rs`).

pub mod disease_history_service_impl;
pub mod patient_service_impl;
pub mod pending_test_service_impl;
pub mod presence_service_impl;

pub use disease_history_service_impl::{
    DiseaseHistoryServiceComponent, DiseaseHistoryServiceComponentParameters,
};
pub use patient_service_impl::{PatientServiceComponent, PatientServiceComponentParameters};
pub use pending_test_service_impl::PendingTestServiceComponent;
pub use presence_service_impl::{PresenceServiceComponent, PresenceServiceComponentParameters};

use clinica_core::{ClinicaError, ClinicaResult, HistoryId, PatientId};

fn require_patient_id(id: &PatientId) -> ClinicaResult<()> {
    if id.is_blank() {
        return Err(ClinicaError::validation("Patient ID is required"));
    }
    Ok(())
}

fn require_history_id(id: &HistoryId) -> ClinicaResult<()> {
    if id.is_blank() {
        return Err(ClinicaError::validation("History ID is required"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cache::{CacheTtls, InMemoryCacheStore};
    use crate::dto::{CreatePatientRequest, InitialHistoryEntry};
    use async_trait::async_trait;
    use clinica_core::{
        ClinicaError, ClinicaResult, DiseaseHistory, DiseaseHistoryFilter, HistoryId, Patient,
        PatientChanges, PatientFilter, PatientId,
    };
    use clinica_repository::{InMemoryPatientRepository, PatientRepository};
    use std::sync::Arc;

    /// In-memory store and cache shared by a set of services under test.
    pub struct Fixture {
        pub repository: Arc<InMemoryPatientRepository>,
        pub cache: Arc<InMemoryCacheStore>,
        pub ttls: CacheTtls,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                repository: Arc::new(InMemoryPatientRepository::new()),
                cache: Arc::new(InMemoryCacheStore::new()),
                ttls: CacheTtls::default(),
            }
        }
    }

    pub fn create_request(id: &str, phone: &str) -> CreatePatientRequest {
        CreatePatientRequest {
            patient_id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: phone.to_string(),
            dob: "1815-12-10".to_string(),
            address: "12 St James's Square".to_string(),
            gender: "F".to_string(),
            disease_history: Vec::new(),
        }
    }

    pub fn initial_entry(id: &str, name: &str) -> InitialHistoryEntry {
        InitialHistoryEntry {
            id: id.to_string(),
            diseases_name: name.to_string(),
        }
    }

    fn down() -> ClinicaError {
        ClinicaError::Database("connection refused".to_string())
    }

    /// Document store that fails every call.
    pub struct UnavailableRepository;

    #[async_trait]
    impl PatientRepository for UnavailableRepository {
        async fn find_by_id(&self, _id: &PatientId) -> ClinicaResult<Option<Patient>> {
            Err(down())
        }

        async fn exists(&self, _id: &PatientId) -> ClinicaResult<bool> {
            Err(down())
        }

        async fn find_all(&self, _filter: &PatientFilter) -> ClinicaResult<Vec<Patient>> {
            Err(down())
        }

        async fn insert(&self, _patient: &Patient) -> ClinicaResult<Patient> {
            Err(down())
        }

        async fn update(&self, _id: &PatientId, _changes: &PatientChanges) -> ClinicaResult<Option<Patient>> {
            Err(down())
        }

        async fn delete(&self, _id: &PatientId) -> ClinicaResult<bool> {
            Err(down())
        }

        async fn find_by_history_id(&self, _history_id: &HistoryId) -> ClinicaResult<Option<Patient>> {
            Err(down())
        }

        async fn history_exists(&self, _history_id: &HistoryId) -> ClinicaResult<bool> {
            Err(down())
        }

        async fn find_history(&self, _filter: &DiseaseHistoryFilter) -> ClinicaResult<Vec<DiseaseHistory>> {
            Err(down())
        }

        async fn push_history(&self, _entry: &DiseaseHistory) -> ClinicaResult<bool> {
            Err(down())
        }

        async fn pull_history(&self, _history_id: &HistoryId) -> ClinicaResult<Option<PatientId>> {
            Err(down())
        }

        async fn set_history_name(
            &self,
            _history_id: &HistoryId,
            _owner: Option<&PatientId>,
            _diseases_name: &str,
        ) -> ClinicaResult<Option<DiseaseHistory>> {
            Err(down())
        }

        async fn ping(&self) -> ClinicaResult<()> {
            Err(down())
        }
    }
}
