//! Online-status and pending-test endpoints nested under a patient.

use crate::{
    responses::{created, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use clinica_core::{PatientId, ValidateExt};
use clinica_service::{
    AddPendingTestRequest, OnlineStatusResponse, PendingTestAddedResponse, PendingTestsResponse,
    SetOnlineStatusRequest,
};
use tracing::debug;

/// Routes relative to the patient collection.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/online", get(get_online_status).put(set_online_status))
        .route(
            "/:id/pending-tests",
            get(get_pending_tests).post(add_pending_test),
        )
}

async fn get_online_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OnlineStatusResponse> {
    let patient_id = PatientId::parse(&id)?;
    let online = state.presence_service.is_online(&patient_id).await?;
    ok(OnlineStatusResponse { patient_id, online })
}

async fn set_online_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetOnlineStatusRequest>,
) -> ApiResult<OnlineStatusResponse> {
    debug!("Setting online status for {}: {}", id, request.online);
    let patient_id = PatientId::parse(&id)?;
    state
        .presence_service
        .set_online_status(&patient_id, request.online)
        .await?;
    ok(OnlineStatusResponse {
        patient_id,
        online: request.online,
    })
}

async fn get_pending_tests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PendingTestsResponse> {
    let patient_id = PatientId::parse(&id)?;
    let tests = state.pending_test_service.get_pending_tests(&patient_id).await?;
    ok(PendingTestsResponse { patient_id, tests })
}

async fn add_pending_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddPendingTestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PendingTestAddedResponse>>), AppError> {
    debug!("Queueing pending test for {}", id);
    request.validate_request()?;
    let patient_id = PatientId::parse(&id)?;
    let queue_length = state
        .pending_test_service
        .add_pending_test(&patient_id, &request.test_name)
        .await?;
    Ok(created(PendingTestAddedResponse {
        patient_id,
        queue_length,
    }))
}
