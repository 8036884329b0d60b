//! Validation utilities.

use crate::{ClinicaError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `ClinicaError` on failure.
    fn validate_request(&self) -> Result<(), ClinicaError> {
        self.validate().map_err(validation_errors_to_clinica_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Converts `validator::ValidationErrors` to `ClinicaError`.
#[must_use]
pub fn validation_errors_to_clinica_error(errors: ValidationErrors) -> ClinicaError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    ClinicaError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that an identifier can be embedded in a cache key.
    ///
    /// Entity identifiers form the last segment of single-entity keys, so a
    /// `:` or whitespace inside one would alias another key.
    pub fn key_safe_identifier(value: &str) -> Result<(), ValidationError> {
        not_blank(value)?;
        if value.chars().any(|c| c == ':' || c.is_whitespace()) {
            return Err(ValidationError::new("identifier_invalid_characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(custom(function = not_blank, message = "Name is required"))]
        name: String,
        #[validate(custom(function = key_safe_identifier))]
        id: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x").is_ok());
        assert!(not_blank("  ").is_err());
    }

    #[test]
    fn test_key_safe_identifier() {
        assert!(key_safe_identifier("000002").is_ok());
        assert!(key_safe_identifier("65a1f0c2e4b0a1b2c3d4e5f6").is_ok());
        assert!(key_safe_identifier("a:b").is_err());
        assert!(key_safe_identifier("a b").is_err());
        assert!(key_safe_identifier("").is_err());
    }

    #[test]
    fn test_validate_request_collects_fields() {
        let probe = Probe {
            name: " ".to_string(),
            id: "x:y".to_string(),
        };
        let err = probe.validate_request().unwrap_err();
        let ClinicaError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("name: Name is required"));
        assert!(message.contains("id: identifier_invalid_characters"));
    }
}
