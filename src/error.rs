//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation, eliminating
//! repetitive error handling patterns throughout the codebase.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Central application error type that encompasses all possible error conditions.
///
/// This enum provides a unified way to handle errors across the application,
/// with automatic conversion to appropriate HTTP responses. _Db errors are logged
/// automatically, while other errors should be logged at the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error(transparent)]
    Csrf(#[from] CsrfError),

    #[error("internal server error")]
    Internal,
}

/// Rejections produced by the double-submit-cookie check.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    /// Cookie token, header token, or both are absent
    #[error("CSRF token missing")]
    Missing,
    /// Both tokens are present but differ
    #[error("CSRF token invalid")]
    Invalid,
}

impl CsrfError {
    /// Machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            CsrfError::Missing => "CSRF_TOKEN_MISSING",
            CsrfError::Invalid => "CSRF_TOKEN_INVALID",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            CsrfError::Missing => "CSRF token missing",
            CsrfError::Invalid => "CSRF token invalid",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

#[derive(Serialize)]
struct CsrfErrorBody {
    error: &'static str,
    code: &'static str,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        let body = Json(CsrfErrorBody {
            error: self.message(),
            code: self.code(),
        });
        (StatusCode::FORBIDDEN, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Db(e) = &self {
            // Log detailed database errors for internal tracking
            error!(?e, "Database error occurred");
        }

        let (status, message) = match self {
            AppError::Csrf(e) => return e.into_response(),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(ErrorBody { message });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
