//! Domain Value Objects
//!
//! Immutable value types for the analysis domain.

use serde::Serialize;
use std::fmt;

/// Maximum byte length of an identity-provider subject
pub const OWNER_ID_MAX_BYTES: usize = 255;

/// Default statement limit, in characters
pub const STATEMENT_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnerIdError {
    #[error("Owner id cannot be empty")]
    Empty,
    #[error("Owner id is too long ({length} bytes, maximum {max})")]
    TooLong { length: usize, max: usize },
}

/// Owner of rate-limit slots and history rows: the identity provider's subject
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(raw: &str) -> Result<Self, OwnerIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OwnerIdError::Empty);
        }
        if trimmed.len() > OWNER_ID_MAX_BYTES {
            return Err(OwnerIdError::TooLong {
                length: trimmed.len(),
                max: OWNER_ID_MAX_BYTES,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    #[error("Statement cannot be empty")]
    Empty,
}

/// Sanitized user statement
///
/// Trimmed, never empty, and at most `max_chars` Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Statement(String);

impl Statement {
    /// Trim, reject blank input, then truncate to `max_chars`
    pub fn parse(raw: &str, max_chars: usize) -> Result<Self, StatementError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StatementError::Empty);
        }

        let truncated = match trimmed.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &trimmed[..byte_idx],
            None => trimmed,
        };

        Ok(Self(truncated.to_string()))
    }

    /// Rehydrate a statement that was validated before it was stored
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
