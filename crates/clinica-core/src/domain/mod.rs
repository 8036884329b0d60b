//! # Clinica Domain
//!
//! Patient records and the disease-history entries embedded in them, plus
//! the filter predicates used by list queries.

pub mod entities;
pub mod query;

pub use entities::*;
pub use query::*;
