//! Cache key generators.
//!
//! The key namespace is shared with other clients of the same Redis
//! instance, so the layouts here are fixed:
//!
//! | Key | Holds |
//! |---|---|
//! | `patient:{id}` | patient JSON |
//! | `patients:{idFilter}:{phoneFilter}` | patient list JSON |
//! | `onlineStatus:{id}` | `"true"` / `"false"` |
//! | `diseaseHistory:{patientId}:{historyId}` | entry hash |
//! | `diseaseHistory:{idFilter}:{patientIdFilter}` | entry list JSON |
//! | `pendingTests:{patientId}` | list of test names |
//!
//! Filter values are escaped (`%` as `%25`, `:` as `%3A`) so that distinct
//! filter combinations never produce the same key.
//!
//! The two `diseaseHistory:` layouts overlap: the list for `id=A&patientId=B`
//! and the entry hash of history `B` under patient `A` share the key
//! `diseaseHistory:A:B`. Whichever is written last wins, and the other reads
//! back as a wrong-type entry, which is discarded and reloaded from the store.
//! Alternating reads of the two keep evicting each other but never serve
//! wrong data.

use clinica_core::{DiseaseHistoryFilter, HistoryId, PatientFilter, PatientId};

/// Escapes a filter value for use as one key segment.
#[must_use]
pub fn escape_segment(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Key for a single patient.
#[must_use]
pub fn patient(id: &PatientId) -> String {
    format!("patient:{}", id)
}

/// Key for a filtered patient list.
#[must_use]
pub fn patient_list(filter: &PatientFilter) -> String {
    format!(
        "patients:{}:{}",
        escape_segment(filter.id().unwrap_or_default()),
        escape_segment(filter.phone().unwrap_or_default())
    )
}

/// Pattern matching every patient list key.
#[must_use]
pub fn patient_lists_pattern() -> &'static str {
    "patients:*"
}

/// Key for a patient's online-status flag.
#[must_use]
pub fn online_status(id: &PatientId) -> String {
    format!("onlineStatus:{}", id)
}

/// Key for a single disease-history entry hash.
#[must_use]
pub fn history_entry(patient_id: &PatientId, history_id: &HistoryId) -> String {
    format!("diseaseHistory:{}:{}", patient_id, history_id)
}

/// Key for a filtered disease-history list.
#[must_use]
pub fn history_list(filter: &DiseaseHistoryFilter) -> String {
    format!(
        "diseaseHistory:{}:{}",
        escape_segment(filter.history_id().unwrap_or_default()),
        escape_segment(filter.patient_id().unwrap_or_default())
    )
}

/// Pattern matching every disease-history key, lists and entry hashes alike.
#[must_use]
pub fn history_pattern() -> &'static str {
    "diseaseHistory:*"
}

/// Key for a patient's pending-test queue.
#[must_use]
pub fn pending_tests(patient_id: &PatientId) -> String {
    format!("pendingTests:{}", patient_id)
}

/// First segment of a key, used as a metrics label.
#[must_use]
pub fn family(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}
