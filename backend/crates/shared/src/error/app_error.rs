//! Application Error - the one error shape clients see
//!
//! Domain crates keep their own error enums and convert into [`AppError`]
//! at the HTTP boundary.

use std::borrow::Cow;
use std::fmt;

use super::kind::ErrorKind;

/// Client-facing error: a kind, a message, and an optional retry hint
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::TooManyRequests, "Rate limit exceeded.")
///     .with_retry_after(60);
/// assert_eq!(err.status_code(), 429);
/// assert_eq!(err.retry_after_secs(), Some(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    retry_after_secs: Option<u64>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// Seconds for the `Retry-After` header
    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after_secs
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_error() {
        let err = AppError::new(ErrorKind::BadRequest, "User text is required");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "User text is required");
        assert!(err.retry_after_secs().is_none());
    }

    #[test]
    fn test_owned_message() {
        let attempts = 3;
        let err = AppError::new(
            ErrorKind::InternalServerError,
            format!("Failed after {attempts} attempts"),
        );
        assert_eq!(err.message(), "Failed after 3 attempts");
    }

    #[test]
    fn test_display() {
        let err = AppError::new(ErrorKind::Unauthorized, "Authentication required");
        assert_eq!(err.to_string(), "[Unauthorized] Authentication required");
    }
}
