//! Disease-history entry, embedded inside its owning patient.

use crate::{HistoryId, PatientId};
use serde::{Deserialize, Serialize};

/// One disease-history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseHistory {
    #[serde(rename = "_id")]
    pub id: HistoryId,
    pub patient_id: PatientId,
    #[serde(default)]
    pub diseases_name: String,
}

impl DiseaseHistory {
    #[must_use]
    pub fn new(id: HistoryId, patient_id: PatientId, diseases_name: impl Into<String>) -> Self {
        Self {
            id,
            patient_id,
            diseases_name: diseases_name.into(),
        }
    }
}

