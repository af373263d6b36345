//! Patient endpoints.
//!
//! - `GET /api/patients`: selector list, by first name
//! - `POST /api/patients`: register a patient
//! - `GET /api/patients/:id`: patient record (found or not-found view)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::forms::patient::{submit_patient, PatientForm};
use crate::forms::SubmitOutcome;
use crate::models::PatientOption;
use crate::patients::{self, PatientDetail};
use crate::session::SessionHandle;

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<PatientOption>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patients = patients::list_patients(&conn, &session.practitioner_id())
        .map_err(|e| ApiError::store("Failed to load patients", e))?;
    Ok(Json(PatientsResponse { patients }))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<PatientForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitOutcome>), ApiError> {
    let Json(form) = payload?;
    let conn = ctx.core.open_db()?;
    let outcome = submit_patient(&conn, &session.practitioner_id(), &form)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /api/patients/:id`: an unknown or malformed id yields the
/// not-found view, not an error status.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    Path(id): Path<String>,
) -> Result<Json<PatientDetail>, ApiError> {
    let Ok(patient_id) = Uuid::parse_str(&id) else {
        return Ok(Json(PatientDetail::not_found()));
    };
    let conn = ctx.core.open_db()?;
    let view = patients::patient_detail(&conn, &session.practitioner_id(), &patient_id)
        .map_err(|e| ApiError::store(patients::LOAD_FAILED, e))?;
    Ok(Json(view))
}
