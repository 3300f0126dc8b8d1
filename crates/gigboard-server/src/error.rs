//! Booking error types.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Generic text shown for persistence faults; the real cause only goes to the log.
pub const PERSISTENCE_NOTICE: &str = "An error occurred. The request could not be completed.";

pub const NOT_FOUND_NOTICE: &str = "The requested page does not exist.";

#[derive(Error, Debug)]
pub enum BookingError {
    /// A required field was missing or a value could not be parsed (400)
    #[error("validation error: {0}")]
    Validation(String),

    /// An id did not resolve to a record (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is blocked by dependent records (409)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transaction failure, constraint violation or connection fault (500)
    #[error("database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),
}

impl BookingError {
    pub fn missing(field: &str) -> Self {
        Self::Validation(format!("{field} is required"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "VALIDATION_ERROR",
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::Conflict(_) => "CONFLICT",
            BookingError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            BookingError::Validation(msg)
            | BookingError::NotFound(msg)
            | BookingError::Conflict(msg) => msg,
            BookingError::Persistence(err) => {
                tracing::error!(error = %err, "persistence failure");
                PERSISTENCE_NOTICE.to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for BookingError {
    fn from(rejection: JsonRejection) -> Self {
        BookingError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for BookingError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "unroutable path parameter");
        BookingError::NotFound(NOT_FOUND_NOTICE.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
