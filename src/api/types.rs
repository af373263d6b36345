//! Shared types for the API layer.

use std::sync::{Arc, MutexGuard};

use axum::http::HeaderMap;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::repertory::RepertoryWorkspace;
use crate::session::SessionHandle;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Lock the session's repertory workspace. Never hold the guard across
/// an `.await`.
pub fn lock_workspace(
    session: &SessionHandle,
) -> Result<MutexGuard<'_, RepertoryWorkspace>, ApiError> {
    session
        .workspace
        .lock()
        .map_err(|_| ApiError::Internal("workspace lock poisoned".into()))
}
