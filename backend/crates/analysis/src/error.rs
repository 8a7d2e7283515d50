//! Analysis Error Types
//!
//! This module provides analysis-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Analysis-specific result type alias
pub type AnalysisResult<T> = Result<T, AnalysisError>;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const UPSTREAM_ACCESS_MESSAGE: &str =
    "Unable to access the AI service. The API key may be invalid or restricted.";
pub const UPSTREAM_CONTENT_MESSAGE: &str =
    "Your statement could not be processed. Please try rephrasing it.";
const UPSTREAM_EXHAUSTED_GENERIC: &str = "Failed to analyze statement. Please try again later.";
const INTERNAL_GENERIC: &str = "Internal server error";

/// Analysis-specific error variants
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No verified identity on the request
    #[error("Authentication required")]
    Unauthorized,

    /// Local per-identity limiter denied the request
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited { retry_after_secs: u64 },

    /// Request body failed validation
    #[error("{0}")]
    Validation(String),

    /// Upstream reported quota / rate exhaustion
    #[error("Rate limit exceeded. Please try again later.")]
    UpstreamRateLimited { retry_after_secs: u64 },

    /// Upstream rejected our credentials
    #[error("Unable to access the AI service. The API key may be invalid or restricted.")]
    UpstreamAccess,

    /// Upstream refused the statement itself
    #[error("Your statement could not be processed. Please try rephrasing it.")]
    UpstreamContent,

    /// Every retry attempt failed
    #[error("Failed after {attempts} attempts: {last}")]
    UpstreamExhausted { attempts: u32, last: String },

    /// History could not be read
    #[error("Failed to fetch analysis history")]
    StorageRead,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::Unauthorized => StatusCode::UNAUTHORIZED,
            AnalysisError::RateLimited { .. } | AnalysisError::UpstreamRateLimited { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AnalysisError::Validation(_) | AnalysisError::UpstreamContent => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::UpstreamAccess => StatusCode::FORBIDDEN,
            AnalysisError::UpstreamExhausted { .. }
            | AnalysisError::StorageRead
            | AnalysisError::Database(_)
            | AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Unauthorized => ErrorKind::Unauthorized,
            AnalysisError::RateLimited { .. } | AnalysisError::UpstreamRateLimited { .. } => {
                ErrorKind::TooManyRequests
            }
            AnalysisError::Validation(_) | AnalysisError::UpstreamContent => {
                ErrorKind::BadRequest
            }
            AnalysisError::UpstreamAccess => ErrorKind::Forbidden,
            AnalysisError::UpstreamExhausted { .. }
            | AnalysisError::StorageRead
            | AnalysisError::Database(_)
            | AnalysisError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// `expose_detail` lets exhaustion messages carry the last upstream
    /// error (development builds only).
    pub fn to_app_error(&self, expose_detail: bool) -> AppError {
        let message = match self {
            AnalysisError::UpstreamExhausted { .. } if !expose_detail => {
                UPSTREAM_EXHAUSTED_GENERIC.to_string()
            }
            AnalysisError::Database(_) | AnalysisError::Internal(_) if !expose_detail => {
                INTERNAL_GENERIC.to_string()
            }
            _ => self.to_string(),
        };

        let err = AppError::new(self.kind(), message);
        match self {
            AnalysisError::RateLimited { retry_after_secs }
            | AnalysisError::UpstreamRateLimited { retry_after_secs } => {
                err.with_retry_after(*retry_after_secs)
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AnalysisError::Database(e) => {
                tracing::error!(error = %e, "Analysis database error");
            }
            AnalysisError::Internal(msg) => {
                tracing::error!(message = %msg, "Analysis internal error");
            }
            AnalysisError::UpstreamExhausted { attempts, last } => {
                tracing::error!(
                    attempts = attempts,
                    last_error = %last,
                    "Upstream retries exhausted"
                );
            }
            AnalysisError::UpstreamAccess => {
                tracing::error!("Upstream rejected API credentials");
            }
            AnalysisError::StorageRead => {
                tracing::error!("History read failed");
            }
            AnalysisError::RateLimited { .. } | AnalysisError::UpstreamRateLimited { .. } => {
                tracing::warn!(error = %self, "Analysis rate limited");
            }
            _ => {
                tracing::debug!(error = %self, "Analysis error");
            }
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        err.to_app_error(cfg!(debug_assertions))
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error(cfg!(debug_assertions)).into_response()
    }
}
