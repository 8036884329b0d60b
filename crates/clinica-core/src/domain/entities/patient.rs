//! Patient entity.

use super::DiseaseHistory;
use crate::{HistoryId, PatientId};
use serde::{Deserialize, Serialize};

/// Patient record as held by the document store.
///
/// Field names on the wire follow the stored document (`_id`, `DOB`,
/// `disease_history`), so a cached blob and a store document share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique patient identifier.
    #[serde(rename = "_id")]
    pub id: PatientId,

    /// Given name.
    #[serde(default)]
    pub first_name: String,

    /// Family name.
    #[serde(default)]
    pub last_name: String,

    /// Contact phone number.
    #[serde(default)]
    pub phone: String,

    /// Date of birth, stored as entered.
    #[serde(rename = "DOB", default)]
    pub dob: String,

    /// Postal address.
    #[serde(default)]
    pub address: String,

    /// Gender as entered.
    #[serde(default)]
    pub gender: String,

    /// Embedded disease-history entries, in insertion order.
    #[serde(default)]
    pub disease_history: Vec<DiseaseHistory>,
}

impl Patient {
    /// Creates a patient with no history entries.
    #[must_use]
    pub fn new(id: PatientId) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            dob: String::new(),
            address: String::new(),
            gender: String::new(),
            disease_history: Vec::new(),
        }
    }

    /// Returns the patient's full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Applies a partial update. Absent fields are left untouched.
    pub fn apply(&mut self, changes: &PatientChanges) {
        if let Some(first_name) = &changes.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &changes.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(phone) = &changes.phone {
            self.phone.clone_from(phone);
        }
        if let Some(dob) = &changes.dob {
            self.dob.clone_from(dob);
        }
        if let Some(address) = &changes.address {
            self.address.clone_from(address);
        }
        if let Some(gender) = &changes.gender {
            self.gender.clone_from(gender);
        }
    }

    /// Finds an embedded history entry by its identifier.
    #[must_use]
    pub fn history_entry(&self, history_id: &HistoryId) -> Option<&DiseaseHistory> {
        self.disease_history.iter().find(|h| &h.id == history_id)
    }

    /// Returns true if the patient owns an entry with the given identifier.
    #[must_use]
    pub fn has_history_entry(&self, history_id: &HistoryId) -> bool {
        self.history_entry(history_id).is_some()
    }
}

/// Scalar fields of a patient that an update may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
}

impl PatientChanges {
    /// Returns true if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.dob.is_none()
            && self.address.is_none()
            && self.gender.is_none()
    }
}
