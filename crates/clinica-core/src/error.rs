//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Clinica.
///
/// The variants map onto the failure classes the cache-aside layer has to
/// tell apart: caller mistakes (`Validation`), uniqueness clashes
/// (`Conflict`), terminal absence (`NotFound`), and unavailability of either
/// backing service (`Database`, `Cache`).
#[derive(Error, Debug)]
pub enum ClinicaError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate identifier)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Infrastructure Errors ============
    /// Document store error (connectivity, timeout, query failure)
    #[error("Database error: {0}")]
    Database(String),

    /// Cache store error (connectivity, timeout, command failure)
    #[error("Cache error: {0}")]
    Cache(String),

    /// A cached value could not be decoded into the expected shape.
    ///
    /// Handled inside the service layer by deleting the key and reading
    /// through to the document store.
    #[error("Corrupt cache entry at '{key}': {reason}")]
    CorruptCacheEntry { key: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClinicaError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Cache(_) => 503,
            Self::CorruptCacheEntry { .. }
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_UNAVAILABLE",
            Self::Cache(_) => "CACHE_UNAVAILABLE",
            Self::CorruptCacheEntry { .. } => "CORRUPT_CACHE_ENTRY",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a corrupt cache entry error.
    #[must_use]
    pub fn corrupt_entry<K: Into<String>, R: ToString>(key: K, reason: R) -> Self {
        Self::CorruptCacheEntry {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true when either backing service could not serve the request.
    #[must_use]
    pub const fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Cache(_))
    }

    /// Returns true for a cached value that must be discarded.
    #[must_use]
    pub const fn is_corrupt_entry(&self) -> bool {
        matches!(self, Self::CorruptCacheEntry { .. })
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for ClinicaError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation
                if db_err.code().as_deref() == Some("23505") {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClinicaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `ClinicaError`.
    #[must_use]
    pub fn from_error(error: &ClinicaError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&ClinicaError> for ErrorResponse {
    fn from(error: &ClinicaError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ClinicaError::not_found("Patient", "000002").status_code(), 404);
        assert_eq!(ClinicaError::validation("missing id").status_code(), 400);
        assert_eq!(ClinicaError::conflict("duplicate").status_code(), 409);
        assert_eq!(ClinicaError::Database("down".to_string()).status_code(), 503);
        assert_eq!(ClinicaError::Cache("down".to_string()).status_code(), 503);
        assert_eq!(ClinicaError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ClinicaError::not_found("Patient", 1).error_code(), "NOT_FOUND");
        assert_eq!(ClinicaError::validation("bad").error_code(), "VALIDATION_ERROR");
        assert_eq!(ClinicaError::conflict("dup").error_code(), "CONFLICT");
        assert_eq!(ClinicaError::Cache("x".to_string()).error_code(), "CACHE_UNAVAILABLE");
        assert_eq!(
            ClinicaError::Database("x".to_string()).error_code(),
            "DATABASE_UNAVAILABLE"
        );
        assert_eq!(
            ClinicaError::corrupt_entry("patient:1", "bad json").error_code(),
            "CORRUPT_CACHE_ENTRY"
        );
    }

    #[test]
    fn test_store_unavailable_classification() {
        assert!(ClinicaError::Database("connection refused".to_string()).is_store_unavailable());
        assert!(ClinicaError::Cache("timeout".to_string()).is_store_unavailable());
        assert!(!ClinicaError::not_found("Patient", 1).is_store_unavailable());
        assert!(!ClinicaError::corrupt_entry("k", "r").is_store_unavailable());
    }

    #[test]
    fn test_corrupt_entry_message() {
        let err = ClinicaError::corrupt_entry("patient:000002", "missing field `_id`");
        assert!(err.is_corrupt_entry());
        assert!(err.to_string().contains("patient:000002"));
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn test_json_error_becomes_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ClinicaError::from(json_err);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_response_from_error() {
        let err = ClinicaError::not_found("Patient", "000002");
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "NOT_FOUND");
        assert!(response.message.contains("000002"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let err = ClinicaError::validation("bad input");
        let details = vec![FieldError {
            field: "patient_id".to_string(),
            message: "Patient ID is required".to_string(),
            code: "required".to_string(),
        }];
        let response = ErrorResponse::from(&err).with_details(details);
        assert_eq!(response.details.map(|d| d.len()), Some(1));
    }
}
