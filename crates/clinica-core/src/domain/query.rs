//! List-query filters.
//!
//! Empty strings are treated as "no predicate", so `?id=&number=` and a
//! missing query string select the same rows and share a cache key.

use super::{DiseaseHistory, Patient};
use serde::{Deserialize, Serialize};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Filter for patient list queries.
///
/// Both predicates are case-insensitive substring matches. Values are held
/// lower-cased so equal predicates compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientFilter {
    id: Option<String>,
    phone: Option<String>,
}

impl PatientFilter {
    /// Builds a filter from raw optional inputs.
    #[must_use]
    pub fn new(id: Option<String>, phone: Option<String>) -> Self {
        Self {
            id: non_empty(id).map(|v| v.to_lowercase()),
            phone: non_empty(phone).map(|v| v.to_lowercase()),
        }
    }

    /// The identifier substring, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The phone substring, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns true when no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.phone.is_none()
    }

    /// Evaluates the filter against a patient.
    #[must_use]
    pub fn matches(&self, patient: &Patient) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_deref()
                .map_or(true, |n| haystack.to_lowercase().contains(n))
        };
        contains(patient.id.as_str(), &self.id) && contains(&patient.phone, &self.phone)
    }
}

/// Filter for disease-history list queries.
///
/// Both predicates are exact matches on the entry identifier and the owning
/// patient identifier, so `h1` never selects `h10`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiseaseHistoryFilter {
    history_id: Option<String>,
    patient_id: Option<String>,
}

impl DiseaseHistoryFilter {
    #[must_use]
    pub fn new(history_id: Option<String>, patient_id: Option<String>) -> Self {
        Self {
            history_id: non_empty(history_id),
            patient_id: non_empty(patient_id),
        }
    }

    #[must_use]
    pub fn history_id(&self) -> Option<&str> {
        self.history_id.as_deref()
    }

    #[must_use]
    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history_id.is_none() && self.patient_id.is_none()
    }

    /// Evaluates the filter against a single entry.
    #[must_use]
    pub fn matches(&self, entry: &DiseaseHistory) -> bool {
        self.history_id
            .as_deref()
            .map_or(true, |id| entry.id.as_str() == id)
            && self
                .patient_id
                .as_deref()
                .map_or(true, |id| entry.patient_id.as_str() == id)
    }

    /// Collects matching entries from a set of patients, in patient order
    /// and then insertion order within each patient.
    #[must_use]
    pub fn select<'a, I>(&self, patients: I) -> Vec<DiseaseHistory>
    where
        I: IntoIterator<Item = &'a Patient>,
    {
        patients
            .into_iter()
            .flat_map(|p| p.disease_history.iter())
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HistoryId, PatientId};

    fn patient(id: &str, phone: &str) -> Patient {
        let mut p = Patient::new(PatientId::new(id));
        p.phone = phone.to_string();
        p
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let filter = PatientFilter::new(Some(String::new()), None);
        assert!(filter.is_empty());
        assert_eq!(filter, PatientFilter::default());
    }

    #[test]
    fn test_patient_filter_substring_case_insensitive() {
        let p = patient("AB-0002", "555-1234");
        assert!(PatientFilter::new(Some("ab".into()), None).matches(&p));
        assert!(PatientFilter::new(None, Some("555".into())).matches(&p));
        assert!(!PatientFilter::new(None, Some("9999".into())).matches(&p));
        assert!(!PatientFilter::new(Some("ab".into()), Some("9999".into())).matches(&p));
    }

    #[test]
    fn test_history_filter_exact_match() {
        let mut p = patient("000002", "");
        p.disease_history.push(DiseaseHistory::new(
            HistoryId::new("h1"),
            PatientId::new("000002"),
            "Flu",
        ));
        p.disease_history.push(DiseaseHistory::new(
            HistoryId::new("h10"),
            PatientId::new("000002"),
            "Cold",
        ));

        let selected = DiseaseHistoryFilter::new(Some("h1".into()), None).select([&p]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].diseases_name, "Flu");

        let by_owner = DiseaseHistoryFilter::new(None, Some("000002".into())).select([&p]);
        assert_eq!(by_owner.len(), 2);

        let other = DiseaseHistoryFilter::new(None, Some("00000".into())).select([&p]);
        assert!(other.is_empty());
    }
}
