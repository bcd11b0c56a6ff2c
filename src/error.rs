use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    InternalServerError,
}

/// Reasons a course is rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("schedule must contain at least one day")]
    EmptySchedule,

    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("scheduled day {date} is outside {start}..={end}")]
    DateOutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("time slot on {date} starts at {start} but ends at {end}")]
    InvertedTimeSlot {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            other => {
                error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
