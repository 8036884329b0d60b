//! # Clinica Server Library
//!
//! Dependency injection configuration and server startup utilities.

pub mod di;
pub mod startup;
