use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{
    auth::AuthError,
    services::{booking_service::BookingError, booking_store::StoreError, operators::OperatorError},
};

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    /// Machine-readable classification, e.g. `capacity_exceeded`.
    pub kind: &'static str,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status, kind and message.
    pub fn new(status: StatusCode, kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server_error", msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!("booking store failure: {}", err);
        AppError::internal("internal server error")
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Store(inner) => inner.into(),
            BookingError::NotFound(_) => AppError::not_found(err.to_string()),
            BookingError::CapacityExceeded { .. } => {
                AppError::new(StatusCode::CONFLICT, "capacity_exceeded", err.to_string())
            }
            BookingError::InvalidDraft(_)
            | BookingError::InvalidStatus(_)
            | BookingError::IllegalTransition { .. }
            | BookingError::InvalidRange { .. } => AppError::validation(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden { .. } => {
                AppError::new(StatusCode::FORBIDDEN, "forbidden", err.to_string())
            }
            AuthError::EmptySecret | AuthError::LifetimeOutOfRange | AuthError::Encode(_) => {
                tracing::error!("token authority failure: {}", err);
                AppError::internal("internal server error")
            }
            AuthError::Missing
            | AuthError::Malformed
            | AuthError::BadSignature
            | AuthError::Expired => {
                AppError::new(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
            }
        }
    }
}

impl From<OperatorError> for AppError {
    fn from(err: OperatorError) -> Self {
        match err {
            OperatorError::Sqlx(inner) => StoreError::Sqlx(inner).into(),
            OperatorError::Missing(_) => AppError::validation(err.to_string()),
            OperatorError::EmailTaken(_) => {
                AppError::new(StatusCode::CONFLICT, "email_taken", err.to_string())
            }
            OperatorError::InvalidCredentials => {
                AppError::new(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
            }
            OperatorError::Hashing(_) => {
                tracing::error!("operator credential failure: {}", err);
                AppError::internal("internal server error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}
