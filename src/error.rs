//! Domain error types for the GitHub explorer API.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Fetch errors are narrowed here to the short, static messages end users see;
//! upstream detail is logged and then dropped.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::warn;

use crate::services::github_client::FetchError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data; the message is user-facing
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream fetch failed; the message is user-facing
    #[error("{0}")]
    FetchFailed(String),
}

/// The two remote procedures, used to pick the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    GetUser,
    GetUserRepos,
}

impl Procedure {
    pub fn name(&self) -> &'static str {
        match self {
            Procedure::GetUser => "getUser",
            Procedure::GetUserRepos => "getUserRepos",
        }
    }

    /// Generic message shown when the fetch fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Procedure::GetUser => "Failed to fetch user data",
            Procedure::GetUserRepos => "Failed to fetch repositories",
        }
    }
}

impl AppError {
    /// Narrow a fetch error to its user-facing form.
    pub fn from_fetch(err: FetchError, procedure: Procedure) -> Self {
        match err {
            FetchError::InvalidInput(message) => AppError::InvalidInput(message),
            FetchError::UserNotFound => AppError::NotFound("User".to_string()),
            FetchError::FetchFailed(failure) => {
                warn!(
                    procedure = procedure.name(),
                    reason = failure.reason(),
                    detail = %failure,
                    "Upstream fetch failed"
                );
                AppError::FetchFailed(procedure.failure_message().to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, response_message) = match self {
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            AppError::InvalidInput(_) => ("INVALID_INPUT", self.to_string()),
            AppError::FetchFailed(_) => ("FETCH_FAILED", self.to_string()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
