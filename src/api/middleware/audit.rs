//! Access logging middleware.
//!
//! Logs every API request with practitioner id, method, path and
//! response status. Runs innermost (after auth has injected the session).

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::session::SessionHandle;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let practitioner_id = req
        .extensions()
        .get::<SessionHandle>()
        .map(|s| s.practitioner_id().to_string())
        .unwrap_or_else(|| "-".into());
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        target: "homeocare_lib::access",
        %practitioner_id,
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API request"
    );
    response
}
