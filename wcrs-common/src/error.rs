//! Common error types for WCRS
//!
//! One taxonomy shared by the scheduler service and the pipeline runner.
//! Validation and business-rule rejections carry user-actionable messages;
//! timeslot conflicts are distinct variants so a client can offer "pick
//! another time" instead of a generic failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Common result type for WCRS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across WCRS services
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input: missing title, bad weekday symbol, unparseable time
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Episode date does not land on the show's weekday/start time
    #[error("Schedule mismatch: {0}")]
    ScheduleMismatch(String),

    /// Candidate air date is inside the publish lead-time window
    #[error("Too late to schedule: {0}")]
    TooLateToSchedule(String),

    /// Another show already occupies this (day_of_week, start_time) slot
    #[error("A show already occupies that weekly timeslot")]
    ShowTimeslotConflict,

    /// Another episode is already scheduled at this exact air date
    #[error("An episode is already scheduled at that air date")]
    EpisodeTimeslotConflict,

    /// Acting user is not a host of the show
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested show/episode id absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Catalog or object store unreachable
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code for API payloads
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::ScheduleMismatch(_) => "schedule_mismatch",
            Error::TooLateToSchedule(_) => "too_late_to_schedule",
            Error::ShowTimeslotConflict => "show_timeslot_conflict",
            Error::EpisodeTimeslotConflict => "episode_timeslot_conflict",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::StorageUnavailable(_) => "storage_unavailable",
            Error::Config(_) => "config_error",
            Error::Database(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::ScheduleMismatch(_) | Error::TooLateToSchedule(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::ShowTimeslotConflict | Error::EpisodeTimeslotConflict => StatusCode::CONFLICT,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::StorageUnavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage/database detail stays in the logs, not the payload
        let message = match &self {
            Error::Database(_) | Error::Io(_) | Error::Internal(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "code": self.code(),
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_codes_are_distinguishable() {
        assert_ne!(
            Error::ShowTimeslotConflict.code(),
            Error::EpisodeTimeslotConflict.code()
        );
        assert_ne!(
            Error::Validation("x".into()).code(),
            Error::EpisodeTimeslotConflict.code()
        );
    }

    #[test]
    fn database_detail_never_reaches_payload() {
        let err = Error::Database(sqlx::Error::PoolClosed);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
