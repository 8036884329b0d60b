//! # Clinica Repository
//!
//! The patient document store. Patients are stored as documents with their
//! disease-history entries embedded; entries are never stored on their own.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn PatientRepository>   (domain interface)
//! PostgresPatientRepository         (JSONB documents via SQLx)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! PostgreSQL
//! ```
//!
//! [`InMemoryPatientRepository`] implements the same contract in-process
//! for development and tests.

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod traits;

pub use memory::*;
pub use pool::*;
pub use postgres::*;
pub use traits::*;
