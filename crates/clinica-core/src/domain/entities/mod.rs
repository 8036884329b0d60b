//! Domain entities.

mod disease_history;
mod patient;

pub use disease_history::*;
pub use patient::*;
