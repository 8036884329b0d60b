//! Patient-related DTOs.

use clinica_core::rules::key_safe_identifier;
use clinica_core::{DiseaseHistory, HistoryId, Patient, PatientChanges, PatientId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

/// Disease-history entry supplied with a new patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InitialHistoryEntry {
    #[serde(rename = "_id", alias = "history_id")]
    #[validate(custom(function = key_safe_identifier, message = "History ID is required and may not contain ':' or whitespace"))]
    pub id: String,

    #[serde(default)]
    #[validate(length(max = 256))]
    pub diseases_name: String,
}

/// Request to create a new patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePatientRequest {
    #[serde(default)]
    #[validate(custom(function = key_safe_identifier, message = "Patient ID is required and may not contain ':' or whitespace"))]
    pub patient_id: String,

    #[serde(default)]
    #[validate(length(max = 128))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 128))]
    pub last_name: String,

    #[serde(default)]
    #[validate(length(max = 64))]
    pub phone: String,

    #[serde(rename = "DOB", default)]
    #[validate(length(max = 32))]
    pub dob: String,

    #[serde(default)]
    #[validate(length(max = 512))]
    pub address: String,

    #[serde(default)]
    #[validate(length(max = 32))]
    pub gender: String,

    #[serde(default)]
    #[validate(nested)]
    pub disease_history: Vec<InitialHistoryEntry>,
}

impl CreatePatientRequest {
    /// Returns the first history ID that appears more than once.
    #[must_use]
    pub fn duplicate_history_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.disease_history
            .iter()
            .map(|h| h.id.as_str())
            .find(|id| !seen.insert(*id))
    }

    /// History IDs carried by the request.
    #[must_use]
    pub fn history_ids(&self) -> Vec<HistoryId> {
        self.disease_history
            .iter()
            .map(|h| HistoryId::new(h.id.clone()))
            .collect()
    }

    /// Builds the patient document.
    #[must_use]
    pub fn into_patient(self) -> Patient {
        let id = PatientId::new(self.patient_id);
        let disease_history = self
            .disease_history
            .into_iter()
            .map(|h| DiseaseHistory::new(HistoryId::new(h.id), id.clone(), h.diseases_name))
            .collect();

        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            dob: self.dob,
            address: self.address,
            gender: self.gender,
            disease_history,
        }
    }
}

/// Request to update patient fields. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePatientRequest {
    #[validate(length(max = 128))]
    pub first_name: Option<String>,

    #[validate(length(max = 128))]
    pub last_name: Option<String>,

    #[validate(length(max = 64))]
    pub phone: Option<String>,

    #[serde(rename = "DOB")]
    #[validate(length(max = 32))]
    pub dob: Option<String>,

    #[validate(length(max = 512))]
    pub address: Option<String>,

    #[validate(length(max = 32))]
    pub gender: Option<String>,
}

impl From<UpdatePatientRequest> for PatientChanges {
    fn from(request: UpdatePatientRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            dob: request.dob,
            address: request.address,
            gender: request.gender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinica_core::ValidateExt;

    fn create_request() -> CreatePatientRequest {
        CreatePatientRequest {
            patient_id: "000002".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "555-1234".to_string(),
            dob: "1815-12-10".to_string(),
            ..CreatePatientRequest::default()
        }
    }

    #[test]
    fn test_create_patient_request_valid() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn test_create_patient_request_missing_id() {
        let request = CreatePatientRequest {
            patient_id: "  ".to_string(),
            ..create_request()
        };
        let err = request.validate_request().unwrap_err();
        assert!(err.to_string().contains("patient_id"));
    }

    #[test]
    fn test_create_patient_request_rejects_separator_in_id() {
        let request = CreatePatientRequest {
            patient_id: "a:b".to_string(),
            ..create_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_nested_history_entries_are_validated() {
        let request = CreatePatientRequest {
            disease_history: vec![InitialHistoryEntry {
                id: String::new(),
                diseases_name: "Flu".to_string(),
            }],
            ..create_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_duplicate_history_id() {
        let entry = |id: &str| InitialHistoryEntry {
            id: id.to_string(),
            diseases_name: "Flu".to_string(),
        };
        let request = CreatePatientRequest {
            disease_history: vec![entry("h1"), entry("h2"), entry("h1")],
            ..create_request()
        };
        assert_eq!(request.duplicate_history_id(), Some("h1"));
        assert_eq!(create_request().duplicate_history_id(), None);
    }

    #[test]
    fn test_into_patient_assigns_owner() {
        let request = CreatePatientRequest {
            disease_history: vec![InitialHistoryEntry {
                id: "h1".to_string(),
                diseases_name: "Flu".to_string(),
            }],
            ..create_request()
        };
        let patient = request.into_patient();
        assert_eq!(patient.id.as_str(), "000002");
        assert_eq!(patient.dob, "1815-12-10");
        assert_eq!(patient.disease_history[0].patient_id, patient.id);
    }

    #[test]
    fn test_deserializes_form_field_names() {
        let json = r#"{"patient_id":"000002","DOB":"2000-01-01","disease_history":[{"history_id":"h1","diseases_name":"Flu"}]}"#;
        let request: CreatePatientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.dob, "2000-01-01");
        assert_eq!(request.disease_history[0].id, "h1");
        assert!(request.first_name.is_empty());
    }

    #[test]
    fn test_update_request_into_changes() {
        let request: UpdatePatientRequest = serde_json::from_str(r#"{"phone":"555-9999"}"#).unwrap();
        let changes = PatientChanges::from(request);
        assert_eq!(changes.phone.as_deref(), Some("555-9999"));
        assert!(changes.first_name.is_none());
    }
}
