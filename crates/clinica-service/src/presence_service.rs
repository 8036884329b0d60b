//! Online-status service trait definition.

use clinica_core::{ClinicaResult, Interface, PatientId};
use async_trait::async_trait;

/// Cache-native presence flags.
///
/// Flags have no store counterpart. An expired or never-set flag reads as
/// offline.
#[async_trait]
pub trait PresenceService: Interface + Send + Sync {
    /// Sets a patient's online flag and restarts its expiry.
    async fn set_online_status(&self, patient_id: &PatientId, online: bool) -> ClinicaResult<()>;

    /// Returns true only while an unexpired `true` flag is held.
    async fn is_online(&self, patient_id: &PatientId) -> ClinicaResult<bool>;
}
