//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entities::AnalysisEntry;
use crate::domain::value_objects::OwnerId;
use crate::error::AnalysisResult;

/// History repository trait
#[trait_variant::make(HistoryRepository: Send)]
pub trait LocalHistoryRepository {
    /// Store a new entry
    async fn insert(&self, entry: &AnalysisEntry) -> AnalysisResult<()>;

    /// All entries of `owner`, newest first
    async fn list_by_owner(&self, owner: &OwnerId) -> AnalysisResult<Vec<AnalysisEntry>>;

    /// At most `limit` entries of `owner`, newest first, skipping `offset`
    async fn list_page(
        &self,
        owner: &OwnerId,
        limit: u64,
        offset: u64,
    ) -> AnalysisResult<Vec<AnalysisEntry>>;

    async fn count_by_owner(&self, owner: &OwnerId) -> AnalysisResult<u64>;
}
