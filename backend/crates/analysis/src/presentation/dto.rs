//! API DTOs (Data Transfer Objects)

use crate::application::history::{AppendOutcome, HistoryPage};
use crate::domain::entities::AnalysisEntry;
use crate::domain::services::{
    extract_cognitive_biases, highlight_cognitive_biases, shareable_summary,
};
use chrono::{DateTime, Utc};
use kernel::id::AnalysisEntryId;
use serde::{Deserialize, Serialize};

/// Request for POST /api/analyze
///
/// `userText` stays untyped so a non-string value is a validation error
/// rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub user_text: Option<serde_json::Value>,
}

/// Response for POST /api/analyze
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

/// Request for POST /api/history
#[derive(Debug, Clone, Deserialize)]
pub struct AppendRequest {
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub analysis: Option<String>,
}

/// Response for POST /api/history
#[derive(Debug, Clone, Serialize)]
pub struct AppendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<HistoryEntryDto>,
}

impl AppendResponse {
    pub fn from_outcome(outcome: AppendOutcome, public_base_url: &str) -> Self {
        Self {
            success: outcome.success,
            warning: outcome.warning,
            entry: outcome
                .entry
                .map(|entry| HistoryEntryDto::from_entry(entry, public_base_url)),
        }
    }
}

/// Query for GET /api/history
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One history row as rendered for clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub id: AnalysisEntryId,
    pub statement: String,
    pub analysis: String,
    pub analysis_html: String,
    pub biases: Vec<String>,
    pub share_text: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntryDto {
    pub fn from_entry(entry: AnalysisEntry, public_base_url: &str) -> Self {
        let biases = extract_cognitive_biases(&entry.analysis);
        Self {
            id: entry.id,
            analysis_html: highlight_cognitive_biases(&entry.analysis),
            share_text: shareable_summary(&biases, public_base_url),
            biases,
            statement: entry.statement.into_inner(),
            analysis: entry.analysis,
            created_at: entry.created_at,
        }
    }
}

/// Response for GET /api/history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPageResponse {
    pub entries: Vec<HistoryEntryDto>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl HistoryPageResponse {
    pub fn from_page(page: HistoryPage, public_base_url: &str) -> Self {
        Self {
            entries: page
                .entries
                .into_iter()
                .map(|entry| HistoryEntryDto::from_entry(entry, public_base_url))
                .collect(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        }
    }
}
