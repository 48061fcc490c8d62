use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sqlx::error::ErrorKind;
use utoipa::ToSchema;

/// Error type shared by the persistence, pricing and HTTP layers.
///
/// Every variant maps to one HTTP status in [`IntoResponse`]; the body is
/// always an [`ErrorBody`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The referenced product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The payload is well-formed but its values are out of range.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Any failure raised by sqlx, including store-level constraint rejections.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - SQLite constraint rejections (unique, foreign key, not-null, check) map to 422.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err)
            if matches!(
                db_err.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            ) =>
        {
            tracing::warn!(error = %db_err, "Constraint violation");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONSTRAINT_VIOLATION",
                format!("Rejected by the store: {}", db_err.message()),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
