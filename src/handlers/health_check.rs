//! # Health Check Handler
//!
//! Liveness endpoint for load balancers and deployment tooling. Being a `GET`,
//! it is also the cheapest way for a client to obtain its first CSRF cookie.

use axum::http::StatusCode;
use tracing::{debug, instrument};

/// Returns `200 OK` with an empty body. Touches no storage.
#[instrument]
pub async fn health_check() -> StatusCode {
    debug!("Health check endpoint accessed");
    StatusCode::OK
}
