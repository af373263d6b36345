//! Router fallback: page routes behind the sign-in gate.
//!
//! Unknown `/api/...` paths get a JSON 404. Any other path is resolved to a
//! page: protected pages without a session redirect to the login page,
//! unknown pages answer 404 with the not-found page descriptor.

use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{bearer_token, ApiContext};
use crate::shell::{gate, AppRoute, Gate, LOGIN_PATH};

pub async fn serve(Extension(ctx): Extension<ApiContext>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return ApiError::NotFound(format!("No API route for {path}")).into_response();
    }

    let signed_in = bearer_token(&headers)
        .map(|token| ctx.core.resolve_session(token).is_ok())
        .unwrap_or(false);

    match gate(&AppRoute::resolve(path), signed_in) {
        Gate::Render(page) => Json(page).into_response(),
        Gate::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
        Gate::NotFound(page) => (StatusCode::NOT_FOUND, Json(page)).into_response(),
    }
}
