//! Disease-history controller.

use crate::{
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use clinica_core::{DiseaseHistory, DiseaseHistoryFilter, HistoryId, PatientId};
use clinica_service::{AddHistoryRequest, UpdateHistoryRequest};
use serde::Deserialize;
use tracing::debug;

/// Query parameters for listing history entries.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryListQuery {
    #[serde(alias = "Id")]
    pub id: Option<String>,
    #[serde(rename = "patientId", alias = "patient_id")]
    pub patient_id: Option<String>,
}

impl From<HistoryListQuery> for DiseaseHistoryFilter {
    fn from(query: HistoryListQuery) -> Self {
        Self::new(query.id, query.patient_id)
    }
}

/// Optional owner constraint on single-entry reads.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    #[serde(rename = "patientId", alias = "patient_id")]
    pub patient_id: Option<String>,
}

impl OwnerQuery {
    fn owner(&self) -> Result<Option<PatientId>, AppError> {
        match self.patient_id.as_deref() {
            None | Some("") => Ok(None),
            Some(id) => Ok(Some(PatientId::parse(id)?)),
        }
    }
}

/// Creates the disease-history router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_history).post(add_history))
        .route(
            "/:id",
            get(get_history_entry)
                .put(update_history)
                .delete(delete_history),
        )
}

async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryListQuery>,
) -> ApiResult<Vec<DiseaseHistory>> {
    debug!("Listing disease history: {:?}", query);
    let entries = state.disease_history_service.list_history(query.into()).await?;
    ok(entries)
}

async fn add_history(
    State(state): State<AppState>,
    Json(request): Json<AddHistoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DiseaseHistory>>), AppError> {
    debug!("Adding disease history {} to {}", request.id, request.patient_id);
    let entry = state.disease_history_service.add_history(request).await?;
    Ok(created(entry))
}

async fn get_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<DiseaseHistory> {
    let id = HistoryId::parse(&id)?;
    let owner = query.owner()?;
    let entry = state
        .disease_history_service
        .get_history_entry(&id, owner.as_ref())
        .await?;
    ok(entry)
}

async fn update_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateHistoryRequest>,
) -> ApiResult<DiseaseHistory> {
    debug!("Renaming disease history: {}", id);
    let id = HistoryId::parse(&id)?;
    let entry = state.disease_history_service.update_history(&id, request).await?;
    ok(entry)
}

async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Deleting disease history: {}", id);
    let id = HistoryId::parse(&id)?;
    state.disease_history_service.delete_history(&id).await?;
    Ok(no_content())
}
