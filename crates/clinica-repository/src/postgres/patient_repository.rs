//! PostgreSQL patient repository.
//!
//! Each patient is one row; its disease-history entries are a JSONB array in
//! `disease_history`. Entry lookups use JSONB containment, and entry edits
//! rebuild the array with `jsonb_array_elements ... WITH ORDINALITY` so
//! insertion order is preserved.

use crate::{traits::PatientRepository, DatabasePoolInterface};
use clinica_core::{
    ClinicaError, ClinicaResult, DiseaseHistory, DiseaseHistoryFilter, HistoryId, Patient,
    PatientChanges, PatientFilter, PatientId,
};
use async_trait::async_trait;
use shaku::Component;
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// PostgreSQL patient repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = PatientRepository)]
pub struct PostgresPatientRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PostgresPatientRepository {
    /// Creates a new PostgreSQL patient repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

const PATIENT_COLUMNS: &str =
    "id, first_name, last_name, phone, dob, address, gender, disease_history";

/// Database row representation of a patient.
#[derive(Debug, FromRow)]
struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    phone: String,
    dob: String,
    address: String,
    gender: String,
    disease_history: Json<Vec<DiseaseHistory>>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = ClinicaError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let id = PatientId::parse(&row.id)
            .map_err(|_| ClinicaError::Internal("Blank patient id in database".to_string()))?;

        Ok(Patient {
            id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            dob: row.dob,
            address: row.address,
            gender: row.gender,
            disease_history: row.disease_history.0,
        })
    }
}

fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> ClinicaError {
    match ClinicaError::from(err) {
        ClinicaError::Conflict(_) => ClinicaError::conflict(message),
        other => other,
    }
}

#[async_trait]
impl PatientRepository for PostgresPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> ClinicaResult<Option<Patient>> {
        debug!("Finding patient by id: {}", id);

        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool.inner()?)
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn exists(&self, id: &PatientId) -> ClinicaResult<bool> {
        let result: Option<i32> = sqlx::query_scalar("SELECT 1 FROM patients WHERE id = $1 LIMIT 1")
            .bind(id.as_str())
            .fetch_optional(self.pool.inner()?)
            .await?;

        Ok(result.is_some())
    }

    async fn find_all(&self, filter: &PatientFilter) -> ClinicaResult<Vec<Patient>> {
        debug!("Finding patients, filter: {:?}", filter);

        // Filter values arrive lower-cased; strpos keeps them literal (no LIKE wildcards).
        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE ($1::text IS NULL OR strpos(lower(id), $1) > 0)
              AND ($2::text IS NULL OR strpos(lower(phone), $2) > 0)
            ORDER BY id
            "#
        ))
        .bind(filter.id())
        .bind(filter.phone())
        .fetch_all(self.pool.inner()?)
        .await?;

        rows.into_iter().map(Patient::try_from).collect()
    }

    async fn insert(&self, patient: &Patient) -> ClinicaResult<Patient> {
        debug!("Inserting patient: {}", patient.id);

        let row = sqlx::query_as::<_, PatientRow>(&format!(
            r#"
            INSERT INTO patients ({PATIENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PATIENT_COLUMNS}
            "#
        ))
        .bind(patient.id.as_str())
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.phone)
        .bind(&patient.dob)
        .bind(&patient.address)
        .bind(&patient.gender)
        .bind(Json(&patient.disease_history))
        .fetch_one(self.pool.inner()?)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Patient ID already exists"))?;

        Patient::try_from(row)
    }

    async fn update(&self, id: &PatientId, changes: &PatientChanges) -> ClinicaResult<Option<Patient>> {
        debug!("Updating patient: {}", id);

        let row = sqlx::query_as::<_, PatientRow>(&format!(
            r#"
            UPDATE patients SET
                first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                phone      = COALESCE($4, phone),
                dob        = COALESCE($5, dob),
                address    = COALESCE($6, address),
                gender     = COALESCE($7, gender)
            WHERE id = $1
            RETURNING {PATIENT_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.dob.as_deref())
        .bind(changes.address.as_deref())
        .bind(changes.gender.as_deref())
        .fetch_optional(self.pool.inner()?)
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn delete(&self, id: &PatientId) -> ClinicaResult<bool> {
        debug!("Deleting patient: {}", id);

        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool.inner()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_history_id(&self, history_id: &HistoryId) -> ClinicaResult<Option<Patient>> {
        debug!("Finding patient by history id: {}", history_id);

        let row = sqlx::query_as::<_, PatientRow>(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE disease_history @> jsonb_build_array(jsonb_build_object('_id', $1::text))
            ORDER BY id
            LIMIT 1
            "#
        ))
        .bind(history_id.as_str())
        .fetch_optional(self.pool.inner()?)
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn history_exists(&self, history_id: &HistoryId) -> ClinicaResult<bool> {
        let result: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT 1 FROM patients
            WHERE disease_history @> jsonb_build_array(jsonb_build_object('_id', $1::text))
            LIMIT 1
            "#,
        )
        .bind(history_id.as_str())
        .fetch_optional(self.pool.inner()?)
        .await?;

        Ok(result.is_some())
    }

    async fn find_history(&self, filter: &DiseaseHistoryFilter) -> ClinicaResult<Vec<DiseaseHistory>> {
        debug!("Finding disease history, filter: {:?}", filter);

        // Narrow to candidate documents in SQL, then pick the matching entries.
        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE ($1::text IS NULL
                   OR disease_history @> jsonb_build_array(jsonb_build_object('_id', $1::text)))
              AND ($2::text IS NULL
                   OR disease_history @> jsonb_build_array(jsonb_build_object('patient_id', $2::text)))
            ORDER BY id
            "#
        ))
        .bind(filter.history_id())
        .bind(filter.patient_id())
        .fetch_all(self.pool.inner()?)
        .await?;

        let patients = rows
            .into_iter()
            .map(Patient::try_from)
            .collect::<ClinicaResult<Vec<_>>>()?;

        Ok(filter.select(&patients))
    }

    async fn push_history(&self, entry: &DiseaseHistory) -> ClinicaResult<bool> {
        debug!("Adding history {} to patient {}", entry.id, entry.patient_id);

        let result = sqlx::query(
            r#"
            UPDATE patients
            SET disease_history = disease_history || jsonb_build_array($2::jsonb)
            WHERE id = $1
            "#,
        )
        .bind(entry.patient_id.as_str())
        .bind(Json(entry))
        .execute(self.pool.inner()?)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_history(&self, history_id: &HistoryId) -> ClinicaResult<Option<PatientId>> {
        debug!("Removing history: {}", history_id);

        let owner: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE patients p
            SET disease_history = COALESCE(
                (SELECT jsonb_agg(e ORDER BY ord)
                 FROM jsonb_array_elements(p.disease_history) WITH ORDINALITY AS t(e, ord)
                 WHERE e->>'_id' <> $1),
                '[]'::jsonb)
            WHERE p.id = (
                SELECT id FROM patients
                WHERE disease_history @> jsonb_build_array(jsonb_build_object('_id', $1::text))
                ORDER BY id
                LIMIT 1)
            RETURNING p.id
            "#,
        )
        .bind(history_id.as_str())
        .fetch_optional(self.pool.inner()?)
        .await?;

        Ok(owner.map(PatientId::from))
    }

    async fn set_history_name(
        &self,
        history_id: &HistoryId,
        owner: Option<&PatientId>,
        diseases_name: &str,
    ) -> ClinicaResult<Option<DiseaseHistory>> {
        debug!("Renaming history: {}", history_id);

        let updated_owner: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE patients p
            SET disease_history = (
                SELECT jsonb_agg(
                    CASE WHEN e->>'_id' = $1
                         THEN jsonb_set(e, '{diseases_name}', to_jsonb($3::text))
                         ELSE e END
                    ORDER BY ord)
                FROM jsonb_array_elements(p.disease_history) WITH ORDINALITY AS t(e, ord))
            WHERE p.id = (
                SELECT id FROM patients
                WHERE disease_history @> jsonb_build_array(jsonb_build_object('_id', $1::text))
                  AND ($2::text IS NULL OR id = $2)
                ORDER BY id
                LIMIT 1)
            RETURNING p.id
            "#,
        )
        .bind(history_id.as_str())
        .bind(owner.map(PatientId::as_str))
        .bind(diseases_name)
        .fetch_optional(self.pool.inner()?)
        .await?;

        Ok(updated_owner.map(|patient_id| {
            DiseaseHistory::new(history_id.clone(), PatientId::from(patient_id), diseases_name)
        }))
    }

    async fn ping(&self) -> ClinicaResult<()> {
        self.pool.health_check().await
    }
}
