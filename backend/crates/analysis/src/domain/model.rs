//! Upstream model interface
//!
//! The analysis text is produced by an external LLM. The domain only sees
//! a prompt going in and text or a classified failure coming out.

use platform::retry::Retryable;

/// How an upstream failure should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Quota or rate exhaustion on the provider side
    RateLimited,
    /// Key missing, invalid or lacking permission
    Access,
    /// The provider refused the content of the prompt
    Content,
    /// Network trouble, timeouts, 5xx and malformed replies
    Transient,
}

impl UpstreamErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamErrorKind::RateLimited => "rate_limited",
            UpstreamErrorKind::Access => "access",
            UpstreamErrorKind::Content => "content",
            UpstreamErrorKind::Transient => "transient",
        }
    }
}

/// Classified upstream failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub message: String,
    /// HTTP status from the provider, when one was received
    pub status: Option<u16>,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Transient, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl Retryable for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.kind == UpstreamErrorKind::Transient
    }
}

/// Ordered text parts sent as one user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub parts: Vec<String>,
}

/// Text-generation backend
#[trait_variant::make(AnalysisModel: Send)]
pub trait LocalAnalysisModel {
    /// Run one generation; no retrying here
    async fn generate(&self, prompt: &Prompt) -> Result<String, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(UpstreamError::transient("timeout").is_retryable());
        for kind in [
            UpstreamErrorKind::RateLimited,
            UpstreamErrorKind::Access,
            UpstreamErrorKind::Content,
        ] {
            assert!(!UpstreamError::new(kind, "x").is_retryable(), "{kind:?}");
        }
    }

    #[test]
    fn test_display_is_message() {
        let err = UpstreamError::transient("upstream returned 503").with_status(503);
        assert_eq!(err.to_string(), "upstream returned 503");
        assert_eq!(err.status, Some(503));
    }
}
