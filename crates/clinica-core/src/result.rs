//! Result type aliases for Clinica.

use crate::ClinicaError;

/// A specialized `Result` type for Clinica operations.
pub type ClinicaResult<T> = Result<T, ClinicaError>;
