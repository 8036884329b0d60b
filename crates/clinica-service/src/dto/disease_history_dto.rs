//! Disease-history DTOs.

use clinica_core::rules::{key_safe_identifier, not_blank};
use clinica_core::{DiseaseHistory, HistoryId, PatientId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to add a disease-history entry to an existing patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AddHistoryRequest {
    #[serde(rename = "_id", alias = "history_id", default)]
    #[validate(custom(function = key_safe_identifier, message = "History ID is required and may not contain ':' or whitespace"))]
    pub id: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Patient ID is required"))]
    pub patient_id: String,

    #[serde(default)]
    #[validate(length(max = 256))]
    pub diseases_name: String,
}

impl AddHistoryRequest {
    /// Builds the history sub-document.
    #[must_use]
    pub fn into_entry(self) -> DiseaseHistory {
        DiseaseHistory::new(
            HistoryId::new(self.id),
            PatientId::new(self.patient_id),
            self.diseases_name,
        )
    }
}

/// Request to rename a disease-history entry.
///
/// When `patient_id` is given the entry must belong to that patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateHistoryRequest {
    #[validate(custom(function = not_blank, message = "Patient ID may not be blank"))]
    pub patient_id: Option<String>,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Disease name is required"), length(max = 256))]
    pub diseases_name: String,
}

impl UpdateHistoryRequest {
    /// Owner constraint, if any.
    #[must_use]
    pub fn owner(&self) -> Option<PatientId> {
        self.patient_id.clone().map(PatientId::new)
    }
}

/// Result of warming a patient's history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmHistoryResponse {
    pub patient_id: PatientId,
    pub cached_entries: usize,
}
