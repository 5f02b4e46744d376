use std::time::Duration;

use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use tracing::error;

use crate::api::response::Envelope;

/// Malformed or missing input. Never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    NameRequired,

    #[error("start_date is required")]
    StartDateRequired,

    #[error("end_date is required")]
    EndDateRequired,

    #[error("invalid start date format, expected YYYY-MM-DD")]
    InvalidStartDate,

    #[error("invalid end date format, expected YYYY-MM-DD")]
    InvalidEndDate,

    #[error("end_date must not be before start_date")]
    EndBeforeStart,

    #[error("invalid default page limit: {0}")]
    InvalidDefaultLimit(String),

    #[error("invalid max page limit: {0}")]
    InvalidMaxLimit(String),
}

impl ValidationError {
    /// Name of the input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameRequired => "name",
            ValidationError::StartDateRequired | ValidationError::InvalidStartDate => "start_date",
            ValidationError::EndDateRequired
            | ValidationError::InvalidEndDate
            | ValidationError::EndBeforeStart => "end_date",
            ValidationError::InvalidDefaultLimit(_) | ValidationError::InvalidMaxLimit(_) => "limit",
        }
    }
}

/// Storage-layer failure that is not a missing row.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("course {id} doesn't exist")]
    NotFound { id: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl AppError {
    pub fn not_found(id: impl Into<String>) -> Self {
        AppError::NotFound { id: id.into() }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Persistence(PersistenceError::Database(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            e @ AppError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Persistence(e) => {
                error!("persistence error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(Envelope::<()>::error(status, error_message));

        (status, body).into_response()
    }
}
