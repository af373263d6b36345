//! HTTP API for the practice app.
//!
//! Routes are nested under `/api/`; protected routes pass through
//! Auth → Access log → Handler. Non-API paths fall through to the page
//! gate.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
