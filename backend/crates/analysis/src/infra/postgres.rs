//! PostgreSQL Repository Implementations

use crate::domain::entities::AnalysisEntry;
use crate::domain::repository::HistoryRepository;
use crate::domain::value_objects::{OwnerId, Statement};
use crate::error::{AnalysisError, AnalysisResult};
use crate::infra::store::StoreHandles;
use chrono::{DateTime, Utc};
use kernel::id::AnalysisEntryId;
use std::sync::Arc;
use uuid::Uuid;

/// PostgreSQL-backed history repository
///
/// Inserts go through the service pool, reads through the restricted one.
#[derive(Clone)]
pub struct PgHistoryRepository {
    store: Arc<StoreHandles>,
}

impl PgHistoryRepository {
    pub fn new(store: Arc<StoreHandles>) -> Self {
        Self { store }
    }
}

impl HistoryRepository for PgHistoryRepository {
    async fn insert(&self, entry: &AnalysisEntry) -> AnalysisResult<()> {
        let pool = self.store.service().await?;

        sqlx::query(
            r#"
            INSERT INTO analysis_history (
                id,
                user_id,
                statement,
                analysis,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id.into_uuid())
        .bind(entry.owner_id.as_str())
        .bind(entry.statement.as_str())
        .bind(&entry.analysis)
        .bind(entry.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> AnalysisResult<Vec<AnalysisEntry>> {
        let pool = self.store.restricted().await?;

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, user_id, statement, analysis, created_at
            FROM analysis_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(pool)
        .await?;

        tracing::debug!(owner_id = %owner, count = rows.len(), "History fetched");

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }

    async fn list_page(
        &self,
        owner: &OwnerId,
        limit: u64,
        offset: u64,
    ) -> AnalysisResult<Vec<AnalysisEntry>> {
        let pool = self.store.restricted().await?;

        // BIGINT binds; anything past i64::MAX is an empty page anyway
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, user_id, statement, analysis, created_at
            FROM analysis_history
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

        tracing::debug!(
            owner_id = %owner,
            limit,
            offset,
            count = rows.len(),
            "History page fetched"
        );

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }

    async fn count_by_owner(&self, owner: &OwnerId) -> AnalysisResult<u64> {
        let pool = self.store.restricted().await?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM analysis_history
            WHERE user_id = $1
            "#,
        )
        .bind(owner.as_str())
        .fetch_one(pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    user_id: String,
    statement: String,
    analysis: String,
    created_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_entry(self) -> AnalysisResult<AnalysisEntry> {
        let owner_id = OwnerId::new(&self.user_id)
            .map_err(|e| AnalysisError::Internal(format!("Stored row {}: {e}", self.id)))?;

        Ok(AnalysisEntry {
            id: AnalysisEntryId::from_uuid(self.id),
            owner_id,
            statement: Statement::from_stored(self.statement),
            analysis: self.analysis,
            created_at: self.created_at,
        })
    }
}
