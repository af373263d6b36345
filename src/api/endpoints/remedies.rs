//! `GET /api/remedies`: remedy picker for the prescription form.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::Remedy;

const MAX_REMEDIES: u32 = 200;

#[derive(Deserialize)]
pub struct RemediesQuery {
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct RemediesResponse {
    pub remedies: Vec<Remedy>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<RemediesQuery>, QueryRejection>,
) -> Result<Json<RemediesResponse>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(MAX_REMEDIES).clamp(1, MAX_REMEDIES);
    let conn = ctx.core.open_db()?;
    let remedies = db::list_remedies(&conn, limit)
        .map_err(|e| ApiError::store("Failed to load remedies", e))?;
    Ok(Json(RemediesResponse { remedies }))
}
