//! # Clinica Core
//!
//! Core types, traits, and error definitions for the Clinica patient-record
//! backend. Every other crate in the workspace builds on the identifiers,
//! entities and error taxonomy defined here.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use traits::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
