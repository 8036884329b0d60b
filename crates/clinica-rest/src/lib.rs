//! # Clinica REST
//!
//! REST API layer using Axum. Provides JSON endpoints for patients, their
//! disease history, presence flags, pending tests, and health checks.

pub mod controllers;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
