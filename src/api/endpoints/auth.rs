//! Session endpoints.
//!
//! - `POST /api/auth/session`: identity hand-over, returns a bearer token
//! - `GET /api/auth/session`: current identity (`user` is null when signed out)
//! - `DELETE /api/auth/session`: sign out

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{bearer_token, ApiContext};
use crate::core_state::CoreError;
use crate::session::{Identity, SessionHandle};

pub const IDENTITY_SECRET_HEADER: &str = "X-Identity-Secret";

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub session_id: Uuid,
}

impl From<&SessionHandle> for UserView {
    fn from(session: &SessionHandle) -> Self {
        Self {
            id: session.identity.practitioner_id,
            full_name: session.identity.full_name.clone(),
            email: session.identity.email.clone(),
            session_id: session.session_id,
        }
    }
}

#[derive(Serialize)]
pub struct SessionOpened {
    pub token: String,
    pub user: UserView,
}

#[derive(Serialize)]
pub struct SessionState {
    pub user: Option<UserView>,
    pub loading: bool,
}

#[derive(Serialize)]
pub struct SignedOut {
    pub signed_out: bool,
}

/// `POST /api/auth/session`: open a session for a practitioner the
/// identity service vouches for.
pub async fn open(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    payload: Result<Json<Identity>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionOpened>), ApiError> {
    let Json(identity) = payload?;
    let presented = headers
        .get(IDENTITY_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented.is_empty() || !ctx.core.verify_identity_secret(presented) {
        tracing::warn!("Session hand-over rejected: bad identity secret");
        return Err(ApiError::Forbidden("Identity hand-over not accepted".into()));
    }

    let full_name = identity.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::BadRequest("full_name is required".into()));
    }
    let identity = Identity {
        full_name: full_name.to_string(),
        email: identity.email.filter(|e| !e.trim().is_empty()),
        ..identity
    };

    let (token, session) = ctx.core.open_session(identity)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionOpened {
            token,
            user: UserView::from(&session),
        }),
    ))
}

/// `GET /api/auth/session`: who is signed in on this token.
pub async fn current(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<SessionState>, ApiError> {
    let user = match bearer_token(&headers) {
        Some(token) => match ctx.core.resolve_session(token) {
            Ok(session) => Some(UserView::from(&session)),
            Err(CoreError::NoSession) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };
    Ok(Json(SessionState {
        user,
        loading: false,
    }))
}

/// `DELETE /api/auth/session`: sign out. In-flight repertory searches of
/// this session are discarded.
pub async fn close(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<SignedOut>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let signed_out = ctx.core.close_session(token)?;
    Ok(Json(SignedOut { signed_out }))
}
