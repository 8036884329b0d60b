//! Pending-test queue service trait definition.

use clinica_core::{ClinicaResult, Interface, PatientId};
use async_trait::async_trait;

/// Per-patient FIFO queue of pending test names held in the cache store.
#[async_trait]
pub trait PendingTestService: Interface + Send + Sync {
    /// Appends a test. Returns the queue length after the append.
    async fn add_pending_test(&self, patient_id: &PatientId, test_name: &str) -> ClinicaResult<u64>;

    /// Returns the whole queue, oldest first.
    async fn get_pending_tests(&self, patient_id: &PatientId) -> ClinicaResult<Vec<String>>;
}
