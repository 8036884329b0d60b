//! Patient controller.

use crate::{
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clinica_core::{Patient, PatientFilter, PatientId};
use clinica_service::{
    CreatePatientRequest, UpdatePatientRequest, WarmHistoryResponse,
};
use serde::Deserialize;
use tracing::debug;

/// Query parameters for listing patients.
///
/// `number` filters on phone.
#[derive(Debug, Default, Deserialize)]
pub struct PatientListQuery {
    pub id: Option<String>,
    pub number: Option<String>,
}

impl From<PatientListQuery> for PatientFilter {
    fn from(query: PatientListQuery) -> Self {
        Self::new(query.id, query.number)
    }
}

/// Creates the patient router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route(
            "/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/:id/history/warm", post(warm_history))
        .merge(super::presence_controller::router())
}

async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> ApiResult<Vec<Patient>> {
    debug!("Listing patients: {:?}", query);
    let patients = state.patient_service.list_patients(query.into()).await?;
    ok(patients)
}

async fn create_patient(
    State(state): State<AppState>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), AppError> {
    debug!("Creating patient: {}", request.patient_id);
    let patient = state.patient_service.create_patient(request).await?;
    Ok(created(patient))
}

async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Patient> {
    debug!("Getting patient: {}", id);
    let id = PatientId::parse(&id)?;
    let patient = state.patient_service.get_patient(&id).await?;
    ok(patient)
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePatientRequest>,
) -> ApiResult<Patient> {
    debug!("Updating patient: {}", id);
    let id = PatientId::parse(&id)?;
    let patient = state.patient_service.update_patient(&id, request).await?;
    ok(patient)
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Deleting patient: {}", id);
    let id = PatientId::parse(&id)?;
    state.patient_service.delete_patient(&id).await?;
    Ok(no_content())
}

async fn warm_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WarmHistoryResponse> {
    debug!("Warming disease history for patient: {}", id);
    let patient_id = PatientId::parse(&id)?;
    let cached_entries = state
        .disease_history_service
        .warm_patient_history(&patient_id)
        .await?;
    ok(WarmHistoryResponse {
        patient_id,
        cached_entries,
    })
}
