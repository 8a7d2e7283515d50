//! History Use Cases
//!
//! Writes soft-fail: a store error still reports success, with a warning
//! and no entry. Reads hard-fail.

use crate::application::config::AnalysisConfig;
use crate::domain::entities::{AnalysisEntry, NewAnalysis};
use crate::domain::repository::HistoryRepository;
use crate::domain::value_objects::OwnerId;
use crate::error::{AnalysisError, AnalysisResult};
use std::sync::Arc;

pub const SAVE_WARNING: &str = "Analysis could not be saved to history";

/// Result of an append; `success` is always true
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub success: bool,
    pub entry: Option<AnalysisEntry>,
    pub warning: Option<String>,
}

/// Requested page, clamped to the configured bounds on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>, config: &AnalysisConfig) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(config.default_page_size)
                .clamp(1, config.max_page_size.max(1)),
        }
    }

    /// 1-based
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub entries: Vec<AnalysisEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// History Service
pub struct HistoryService<R>
where
    R: HistoryRepository,
{
    repo: Arc<R>,
}

impl<R> HistoryService<R>
where
    R: HistoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Store a statement/analysis pair for `owner`
    pub async fn append(&self, owner: &OwnerId, new: NewAnalysis) -> AppendOutcome {
        let entry = AnalysisEntry::new(owner.clone(), new);

        match self.repo.insert(&entry).await {
            Ok(()) => {
                tracing::info!(
                    owner_id = %owner,
                    entry_id = %entry.id,
                    "Analysis saved to history"
                );
                AppendOutcome {
                    success: true,
                    entry: Some(entry),
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!(owner_id = %owner, error = %e, "History write failed, continuing");
                AppendOutcome {
                    success: true,
                    entry: None,
                    warning: Some(SAVE_WARNING.to_string()),
                }
            }
        }
    }

    /// All entries of `owner`, newest first
    pub async fn list(&self, owner: &OwnerId) -> AnalysisResult<Vec<AnalysisEntry>> {
        self.repo.list_by_owner(owner).await.map_err(|e| {
            tracing::error!(owner_id = %owner, error = %e, "History read failed");
            AnalysisError::StorageRead
        })
    }

    /// One page of the owner's entries, newest first, plus the total count
    pub async fn page(&self, owner: &OwnerId, request: PageRequest) -> AnalysisResult<HistoryPage> {
        let read_failed = |e: AnalysisError| {
            tracing::error!(owner_id = %owner, error = %e, "History read failed");
            AnalysisError::StorageRead
        };

        let total = self.repo.count_by_owner(owner).await.map_err(read_failed)?;
        let entries = self
            .repo
            .list_page(owner, request.limit(), request.offset())
            .await
            .map_err(read_failed)?;

        Ok(HistoryPage {
            entries,
            page: request.page,
            per_page: request.per_page,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::value_objects::Statement;
    use crate::tests::support::InMemoryHistoryRepository;
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamps() {
        let config = AnalysisConfig::default();

        assert_eq!(
            PageRequest::new(None, None, &config),
            PageRequest { page: 1, per_page: 10 }
        );
        assert_eq!(
            PageRequest::new(Some(0), Some(0), &config),
            PageRequest { page: 1, per_page: 1 }
        );
        assert_eq!(
            PageRequest::new(Some(3), Some(500), &config),
            PageRequest { page: 3, per_page: 50 }
        );
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(PageRequest { page: 1, per_page: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, per_page: 10 }.offset(), 20);
        assert_eq!(
            PageRequest { page: u32::MAX, per_page: 50 }.offset(),
            (u64::from(u32::MAX) - 1) * 50
        );
    }

    #[test]
    fn test_page_zero_offset_does_not_underflow() {
        let request = PageRequest { page: 0, per_page: 10 };
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 10);
    }

    #[tokio::test]
    async fn test_page_zero_served_as_first_page() {
        let service = HistoryService::new(Arc::new(InMemoryHistoryRepository::default()));
        let owner = OwnerId::new("user_1").unwrap();
        for statement in ["older", "newer"] {
            let new = NewAnalysis {
                statement: Statement::parse(statement, 2000).unwrap(),
                analysis: "a".to_string(),
            };
            service.append(&owner, new).await;
        }

        let page = service
            .page(&owner, PageRequest { page: 0, per_page: 10 })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].statement.as_str(), "newer");
    }
}
