//! # CSRF Middleware
//!
//! Enforces the double-submit-cookie pattern on every route it wraps.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Span, debug, error, instrument, trace};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::AppState;
use crate::services::csrf;
use crate::utils::constant::REQUEST_ID_HEADER;

/// Double-submit-cookie guard for state-changing requests
///
/// # Flow
///
/// 1. Safe methods (`GET`, `HEAD`, `OPTIONS`) pass through unchecked and the
///    response receives a newly minted `csrf_token` cookie
/// 2. Every other method must carry both the cookie and a matching
///    `X-CSRF-Token` header
/// 3. After a successful check the handler runs and the token is rotated
///
/// # Returns
///
/// - **Success**: The handler's response with a fresh `Set-Cookie`
/// - **Failure**: `403 Forbidden` with `CSRF_TOKEN_MISSING` or `CSRF_TOKEN_INVALID`,
///   without a cookie
///
/// The span opened here carries the request id for every handler span nested
/// under it; the id is echoed in the `x-request-id` response header.
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = tracing::field::Empty
    )
)]
pub async fn csrf_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4();
    Span::current().record("request_id", tracing::field::display(request_id));

    let mut response = guard(&state, req, next).await;
    // A hyphenated uuid is always a valid header value
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn guard(state: &AppState, req: Request, next: Next) -> Response {
    let secure = state.csrf.is_secure_request(req.uri(), req.headers());

    if csrf::is_safe_method(req.method()) {
        trace!("Safe method, issuing CSRF token");
    } else {
        if let Err(e) = csrf::verify(req.headers()) {
            return e.into_response();
        }
        debug!("CSRF token verified, rotating");
    }

    let mut response = next.run(req).await;
    let token = csrf::generate_token();
    match csrf::set_cookie_value(&token, secure) {
        Ok(cookie) => {
            response.headers_mut().append(header::SET_COOKIE, cookie);
            response
        }
        Err(e) => {
            error!(?e, "Failed to encode CSRF cookie");
            AppError::Internal.into_response()
        }
    }
}
