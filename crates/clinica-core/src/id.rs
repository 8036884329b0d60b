//! Typed ID wrappers for domain entities.
//!
//! Identifiers are opaque strings. They are compared and stored verbatim;
//! nothing inspects their shape to guess a database-native identifier type.

use crate::{ClinicaError, ClinicaResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A strongly-typed wrapper for patient identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a patient ID without checking it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a patient ID supplied by a caller.
    ///
    /// Blank identifiers are rejected before any store or cache access.
    pub fn parse(id: &str) -> ClinicaResult<Self> {
        if id.trim().is_empty() {
            return Err(ClinicaError::validation("Patient ID is required"));
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PatientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PatientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A strongly-typed wrapper for disease-history entry identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(String);

impl HistoryId {
    /// Creates a history ID without checking it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a history ID supplied by a caller.
    pub fn parse(id: &str) -> ClinicaResult<Self> {
        if id.trim().is_empty() {
            return Err(ClinicaError::validation("History ID is required"));
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HistoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HistoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_parsing() {
        let id = PatientId::parse("000002").unwrap();
        assert_eq!(id.as_str(), "000002");
        assert_eq!(id.to_string(), "000002");
    }

    #[test]
    fn test_blank_ids_are_rejected() {
        assert!(matches!(PatientId::parse(""), Err(ClinicaError::Validation(_))));
        assert!(matches!(PatientId::parse("   "), Err(ClinicaError::Validation(_))));
        assert!(matches!(HistoryId::parse(""), Err(ClinicaError::Validation(_))));
    }

    #[test]
    fn test_object_id_shaped_strings_stay_opaque() {
        let raw = "65a1f0c2e4b0a1b2c3d4e5f6";
        let id = PatientId::parse(raw).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{raw}\""));
    }

    #[test]
    fn test_history_id_serde_is_transparent() {
        let id: HistoryId = serde_json::from_str("\"h1\"").unwrap();
        assert_eq!(id, HistoryId::from("h1"));
    }
}
