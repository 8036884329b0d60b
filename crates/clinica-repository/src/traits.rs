//! Repository trait definitions.

use clinica_core::{
    ClinicaResult, DiseaseHistory, DiseaseHistoryFilter, HistoryId, Interface, Patient,
    PatientChanges, PatientFilter, PatientId,
};
use async_trait::async_trait;

/// Patient document store.
///
/// Disease-history entries live inside their owning patient document, so the
/// history operations below are array mutations on that document.
#[async_trait]
pub trait PatientRepository: Interface + Send + Sync {
    /// Finds a patient by ID.
    async fn find_by_id(&self, id: &PatientId) -> ClinicaResult<Option<Patient>>;

    /// Checks if a patient exists.
    async fn exists(&self, id: &PatientId) -> ClinicaResult<bool>;

    /// Finds all patients matching the filter, ordered by ID.
    async fn find_all(&self, filter: &PatientFilter) -> ClinicaResult<Vec<Patient>>;

    /// Inserts a new patient document.
    ///
    /// Returns `Conflict` when the ID is already taken.
    async fn insert(&self, patient: &Patient) -> ClinicaResult<Patient>;

    /// Applies scalar field changes. Returns `None` if the patient is absent.
    async fn update(&self, id: &PatientId, changes: &PatientChanges) -> ClinicaResult<Option<Patient>>;

    /// Deletes a patient. Returns true if a document was removed.
    async fn delete(&self, id: &PatientId) -> ClinicaResult<bool>;

    /// Finds the patient owning the given history entry.
    async fn find_by_history_id(&self, history_id: &HistoryId) -> ClinicaResult<Option<Patient>>;

    /// Checks if any patient owns the given history entry.
    async fn history_exists(&self, history_id: &HistoryId) -> ClinicaResult<bool>;

    /// Finds history entries matching the filter, in patient then insertion order.
    async fn find_history(&self, filter: &DiseaseHistoryFilter) -> ClinicaResult<Vec<DiseaseHistory>>;

    /// Appends an entry to its owner's history. Returns false if the owner is absent.
    async fn push_history(&self, entry: &DiseaseHistory) -> ClinicaResult<bool>;

    /// Removes an entry. Returns the owner's ID if an entry was removed.
    async fn pull_history(&self, history_id: &HistoryId) -> ClinicaResult<Option<PatientId>>;

    /// Renames an entry in place, optionally restricted to one owner.
    ///
    /// Returns the updated entry, or `None` if no matching entry exists.
    async fn set_history_name(
        &self,
        history_id: &HistoryId,
        owner: Option<&PatientId>,
        diseases_name: &str,
    ) -> ClinicaResult<Option<DiseaseHistory>>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> ClinicaResult<()>;
}
