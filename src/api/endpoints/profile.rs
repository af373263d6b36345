//! Practitioner profile endpoints.
//!
//! - `GET /api/profile`: load the signed-in practitioner's profile
//! - `PUT /api/profile`: update it

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::forms::profile::{submit_profile, ProfileForm};
use crate::forms::SubmitOutcome;
use crate::models::PractitionerProfile;
use crate::session::SessionHandle;

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<PractitionerProfile>, ApiError> {
    let conn = ctx.core.open_db()?;
    db::get_profile(&conn, &session.practitioner_id())
        .map_err(|e| ApiError::store("Failed to load profile", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<ProfileForm>, JsonRejection>,
) -> Result<Json<SubmitOutcome>, ApiError> {
    let Json(form) = payload?;
    let conn = ctx.core.open_db()?;
    Ok(Json(submit_profile(&conn, &session.practitioner_id(), &form)?))
}
