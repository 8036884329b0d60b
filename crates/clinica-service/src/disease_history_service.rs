//! Disease-history service trait definition.

use crate::dto::{AddHistoryRequest, UpdateHistoryRequest};
use clinica_core::{ClinicaResult, DiseaseHistory, DiseaseHistoryFilter, HistoryId, Interface, PatientId};
use async_trait::async_trait;

/// Service for disease-history entries embedded in patient documents.
#[async_trait]
pub trait DiseaseHistoryService: Interface + Send + Sync {
    /// Adds an entry to an existing patient.
    async fn add_history(&self, request: AddHistoryRequest) -> ClinicaResult<DiseaseHistory>;

    /// Gets one entry, optionally constrained to an owner.
    async fn get_history_entry(
        &self,
        id: &HistoryId,
        patient_id: Option<&PatientId>,
    ) -> ClinicaResult<DiseaseHistory>;

    /// Lists entries matching a filter.
    async fn list_history(&self, filter: DiseaseHistoryFilter) -> ClinicaResult<Vec<DiseaseHistory>>;

    /// Renames an entry.
    async fn update_history(&self, id: &HistoryId, request: UpdateHistoryRequest) -> ClinicaResult<DiseaseHistory>;

    /// Removes an entry from its owner.
    async fn delete_history(&self, id: &HistoryId) -> ClinicaResult<()>;

    /// Caches every entry of a patient as its own hash key.
    ///
    /// Returns the number of entries cached. Fails with `Cache` when caching
    /// is disabled.
    async fn warm_patient_history(&self, patient_id: &PatientId) -> ClinicaResult<usize>;
}
