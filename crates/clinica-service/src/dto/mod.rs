//! Data Transfer Objects (DTOs).

mod disease_history_dto;
mod patient_dto;
mod presence_dto;

pub use disease_history_dto::*;
pub use patient_dto::*;
pub use presence_dto::*;
