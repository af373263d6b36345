//! Case endpoints.
//!
//! - `GET /api/cases?patient_id=`: case picker for one patient
//! - `POST /api/cases`: submit the case intake form

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::forms::case::{submit_case, CaseForm};
use crate::forms::SubmitOutcome;
use crate::models::CaseOption;
use crate::patients;
use crate::session::SessionHandle;

#[derive(Deserialize)]
pub struct CasesQuery {
    pub patient_id: Uuid,
}

#[derive(Serialize)]
pub struct CasesResponse {
    pub cases: Vec<CaseOption>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    query: Result<Query<CasesQuery>, QueryRejection>,
) -> Result<Json<CasesResponse>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.core.open_db()?;
    let cases = patients::list_cases_for_patient(&conn, &session.practitioner_id(), &query.patient_id)
        .map_err(|e| ApiError::store("Failed to load cases", e))?;
    Ok(Json(CasesResponse { cases }))
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<CaseForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitOutcome>), ApiError> {
    let Json(form) = payload?;
    let conn = ctx.core.open_db()?;
    let outcome = submit_case(&conn, &session.practitioner_id(), &form)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
