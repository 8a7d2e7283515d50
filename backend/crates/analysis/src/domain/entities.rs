//! Domain Entities
//!
//! Core business entities for the analysis domain.

use crate::domain::value_objects::{OwnerId, Statement};
use chrono::{DateTime, Utc};
use kernel::id::AnalysisEntryId;

/// A statement/analysis pair ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalysis {
    pub statement: Statement,
    pub analysis: String,
}

/// AnalysisEntry entity - one persisted history row
///
/// Immutable once written; there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisEntry {
    pub id: AnalysisEntryId,
    pub owner_id: OwnerId,
    pub statement: Statement,
    pub analysis: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisEntry {
    /// Create a new entry for `owner`
    pub fn new(owner_id: OwnerId, new: NewAnalysis) -> Self {
        Self {
            id: AnalysisEntryId::new(),
            owner_id,
            statement: new.statement,
            analysis: new.analysis,
            created_at: Utc::now(),
        }
    }
}
