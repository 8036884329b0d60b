//! # Clinica Service
//!
//! Cache-aside coordination and the application services built on it.
//!
//! Reads consult the cache store first and fall back to the document store,
//! populating the cache on the way out. Writes go to the document store
//! first; only after they succeed is the cache refreshed or invalidated.

pub mod cache;
pub mod coordinator;
pub mod disease_history_service;
pub mod dto;
pub mod health;
pub mod r#impl;
pub mod patient_service;
pub mod pending_test_service;
pub mod presence_service;

pub use cache::*;
pub use coordinator::*;
pub use disease_history_service::*;
pub use dto::*;
pub use health::*;
pub use patient_service::*;
pub use pending_test_service::*;
pub use presence_service::*;
pub use r#impl::*;
