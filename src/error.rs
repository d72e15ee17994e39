use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the whole application
///
/// Every fallible operation in the crate funnels into one of these variants.
/// The variant decides the HTTP status code; the message is always safe to
/// show to a user (no internal detail, no stack traces).
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or empty spreadsheet input
    #[error("{0}")]
    Parse(String),

    /// Bad enum value or missing/invalid field in a request
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed or expired token, or bad credentials
    #[error("{0}")]
    Auth(String),

    /// Duplicate email on signup or profile update
    #[error("{0}")]
    Conflict(String),

    /// Record absent or not owned by the caller
    #[error("{0}")]
    NotFound(String),

    /// AI collaborator unreachable or returned a non-success response
    #[error("{0}")]
    ExternalService(String),

    /// Anything else; logged server-side, generic message to the client
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for the variant
    ///
    /// Auth failures use 403 across the board, matching the single status
    /// the token middleware and the login handler both return.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Parse(_) | AppError::Validation(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Auth(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap an arbitrary error as an internal error, keeping the detail for the log
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", context, err);
        AppError::Internal(format!("{}: {}", context, err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // `internal` already logged the detail at construction; the client
        // only ever gets the fixed string.
        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
