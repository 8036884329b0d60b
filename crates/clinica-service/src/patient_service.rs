//! Patient service trait definition.

use crate::dto::{CreatePatientRequest, UpdatePatientRequest};
use clinica_core::{ClinicaResult, Interface, Patient, PatientFilter, PatientId};
use async_trait::async_trait;

/// Patient service trait.
#[async_trait]
pub trait PatientService: Interface + Send + Sync {
    /// Creates a new patient, optionally with initial disease-history entries.
    async fn create_patient(&self, request: CreatePatientRequest) -> ClinicaResult<Patient>;

    /// Gets a patient by ID.
    async fn get_patient(&self, id: &PatientId) -> ClinicaResult<Patient>;

    /// Lists patients matching a filter.
    async fn list_patients(&self, filter: PatientFilter) -> ClinicaResult<Vec<Patient>>;

    /// Updates a patient's fields.
    async fn update_patient(&self, id: &PatientId, request: UpdatePatientRequest) -> ClinicaResult<Patient>;

    /// Deletes a patient.
    async fn delete_patient(&self, id: &PatientId) -> ClinicaResult<()>;
}
