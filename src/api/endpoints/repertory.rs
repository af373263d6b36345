//! Repertory endpoints. All of them answer with the session's workspace
//! snapshot.
//!
//! - `GET /api/repertory`: current state (loads the remedy list once)
//! - `POST /api/repertory/search`: new search input
//! - `POST /api/repertory/selection`: open a rubric from the results
//! - `DELETE /api/repertory/selection`: close it
//!
//! Store access runs on the blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{lock_workspace, ApiContext};
use crate::core_state::CoreError;
use crate::models::{Remedy, Rubric};
use crate::repertory::{self, Completion, WorkspaceView};
use crate::session::SessionHandle;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub term: String,
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub rubric_id: Uuid,
}

/// Load remedies into the workspace the first time it is used. A failed
/// load leaves an empty list; badges then show without abbreviations.
async fn ensure_remedies(ctx: &ApiContext, session: &SessionHandle) -> Result<(), ApiError> {
    if !lock_workspace(session)?.needs_remedies() {
        return Ok(());
    }
    let core = ctx.core.clone();
    let loaded = tokio::task::spawn_blocking(move || -> Result<Vec<Remedy>, CoreError> {
        let conn = core.open_db()?;
        Ok(repertory::fetch_remedies(&conn)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("remedy load task failed: {e}")))?;

    let remedies = loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load remedies for repertory");
        Vec::new()
    });
    lock_workspace(session)?.set_remedies(remedies);
    Ok(())
}

fn render(session: &SessionHandle) -> Result<Json<WorkspaceView>, ApiError> {
    Ok(Json(lock_workspace(session)?.render()))
}

pub async fn workspace(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<WorkspaceView>, ApiError> {
    ensure_remedies(&ctx, &session).await?;
    render(&session)
}

/// `POST /api/repertory/search`
///
/// Short input issues no query. Otherwise the query runs off the async
/// runtime and its result is applied only if no newer search was issued
/// for this session in the meantime.
pub async fn search(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<WorkspaceView>, ApiError> {
    let Json(req) = payload?;
    ensure_remedies(&ctx, &session).await?;
    let ticket = lock_workspace(&session)?.begin_search(&req.term);

    if let Some(ticket) = ticket {
        let core = ctx.core.clone();
        let query = ticket.clone();
        let outcome = tokio::task::spawn_blocking(move || -> Result<Vec<Rubric>, CoreError> {
            let conn = core.open_db()?;
            Ok(repertory::fetch_rubrics(&conn, &query)?)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("search task failed: {e}")))?;

        if lock_workspace(&session)?.complete_search(&ticket, outcome) == Completion::Stale {
            tracing::debug!(
                session_id = %session.session_id,
                seq = ticket.seq(),
                "Newer search superseded this response"
            );
        }
    }
    render(&session)
}

pub async fn select(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<Json<WorkspaceView>, ApiError> {
    let Json(req) = payload?;
    ensure_remedies(&ctx, &session).await?;
    if !lock_workspace(&session)?.select_rubric(&req.rubric_id) {
        return Err(ApiError::NotFound("Rubric is not in the current results".into()));
    }
    render(&session)
}

pub async fn deselect(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<WorkspaceView>, ApiError> {
    lock_workspace(&session)?.clear_selection();
    render(&session)
}
