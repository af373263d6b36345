//! Prescription endpoints.
//!
//! - `GET /api/prescriptions?patient_id=`: a patient's prescriptions, newest first
//! - `POST /api/prescriptions`: submit the prescription form

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::forms::prescription::{submit_prescription, PrescriptionForm};
use crate::forms::SubmitOutcome;
use crate::models::Prescription;
use crate::session::SessionHandle;

#[derive(Deserialize)]
pub struct PrescriptionsQuery {
    pub patient_id: Uuid,
}

#[derive(Serialize)]
pub struct PrescriptionsResponse {
    pub prescriptions: Vec<Prescription>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    query: Result<Query<PrescriptionsQuery>, QueryRejection>,
) -> Result<Json<PrescriptionsResponse>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.core.open_db()?;
    let prescriptions =
        db::list_prescriptions_for_patient(&conn, &session.practitioner_id(), &query.patient_id)
            .map_err(|e| ApiError::store("Failed to load prescriptions", e))?;
    Ok(Json(PrescriptionsResponse { prescriptions }))
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<PrescriptionForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitOutcome>), ApiError> {
    let Json(form) = payload?;
    let conn = ctx.core.open_db()?;
    let outcome = submit_prescription(&conn, &session.practitioner_id(), &form)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
