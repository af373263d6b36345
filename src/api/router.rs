//! API router.
//!
//! Routes are nested under `/api/`. Everything else falls through to the
//! page gate.
//!
//! Middleware stack (outermost → innermost):
//! 1. `Cache-Control: no-store` → 2. Auth validator → 3. Access logger

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: require a session
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        .route(
            "/cases",
            get(endpoints::cases::list).post(endpoints::cases::submit),
        )
        .route(
            "/prescriptions",
            get(endpoints::prescriptions::list).post(endpoints::prescriptions::submit),
        )
        .route("/remedies", get(endpoints::remedies::list))
        .route("/repertory", get(endpoints::repertory::workspace))
        .route("/repertory/search", post(endpoints::repertory::search))
        .route(
            "/repertory/selection",
            post(endpoints::repertory::select).delete(endpoints::repertory::deselect),
        )
        .route(
            "/profile",
            get(endpoints::profile::get).put(endpoints::profile::update),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Public routes: health and the session hand-over
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/auth/session",
            post(endpoints::auth::open)
                .get(endpoints::auth::current)
                .delete(endpoints::auth::close),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    Router::new()
        .nest("/api", protected)
        .nest("/api", public)
        .fallback(endpoints::pages::serve)
        .layer(axum::Extension(ctx))
}
