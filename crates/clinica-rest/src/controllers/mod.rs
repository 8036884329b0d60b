//! REST API controllers.

pub mod disease_history_controller;
pub mod health_controller;
pub mod patient_controller;
pub mod presence_controller;

pub use health_controller::*;
