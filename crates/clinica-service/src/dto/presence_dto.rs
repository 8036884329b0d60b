//! Presence and pending-test DTOs.

use clinica_core::rules::not_blank;
use clinica_core::PatientId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to set a patient's online status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetOnlineStatusRequest {
    pub online: bool,
}

/// A patient's online status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineStatusResponse {
    pub patient_id: PatientId,
    pub online: bool,
}

/// Request to queue a pending test.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddPendingTestRequest {
    #[validate(custom(function = not_blank, message = "Test name is required"), length(max = 256))]
    pub test_name: String,
}

/// Result of queueing a pending test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTestAddedResponse {
    pub patient_id: PatientId,
    pub queue_length: u64,
}

/// A patient's pending tests in queue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTestsResponse {
    pub patient_id: PatientId,
    pub tests: Vec<String>,
}
