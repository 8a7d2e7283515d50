//! HTTP Handlers

use crate::application::analyze::AnalyzeStatementUseCase;
use crate::application::config::AnalysisConfig;
use crate::application::history::{HistoryService, PageRequest};
use crate::domain::entities::NewAnalysis;
use crate::domain::model::AnalysisModel;
use crate::domain::repository::HistoryRepository;
use crate::domain::value_objects::Statement;
use crate::error::{AnalysisError, AnalysisResult};
use crate::presentation::dto::{
    AnalyzeRequest, AnalyzeResponse, AppendRequest, AppendResponse, HistoryPageResponse,
    HistoryQuery,
};
use crate::presentation::middleware::CurrentUser;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query, State};
use axum::response::{IntoResponse, Response};
use platform::rate_limit::FixedWindowRateLimiter;
use std::sync::Arc;

pub const HISTORY_FIELDS_REQUIRED: &str = "Statement and analysis are required";
const INVALID_PAGINATION: &str = "Invalid pagination parameters";

/// Shared state for analysis handlers
#[derive(Clone)]
pub struct AnalysisAppState<R, M>
where
    R: HistoryRepository + Clone + Send + Sync + 'static,
    M: AnalysisModel + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub model: Arc<M>,
    pub limiter: Arc<FixedWindowRateLimiter>,
    pub config: Arc<AnalysisConfig>,
}

impl<R, M> AnalysisAppState<R, M>
where
    R: HistoryRepository + Clone + Send + Sync + 'static,
    M: AnalysisModel + Clone + Send + Sync + 'static,
{
    /// Build state with a fresh limiter sized from `config`
    pub fn new(repo: R, model: M, config: AnalysisConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            model: Arc::new(model),
            limiter: Arc::new(FixedWindowRateLimiter::new(config.rate_limit.clone())),
            config: Arc::new(config),
        }
    }
}

/// POST /api/analyze
pub async fn analyze<R, M>(
    State(state): State<AnalysisAppState<R, M>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AnalysisResult<Response>
where
    R: HistoryRepository + Clone + Send + Sync + 'static,
    M: AnalysisModel + Clone + Send + Sync + 'static,
{
    let user_text = body.ok().and_then(|Json(req)| req.user_text);

    let use_case = AnalyzeStatementUseCase::new(
        state.model.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(&owner, user_text.as_ref().and_then(|v| v.as_str()))
        .await?;

    let mut response = Json(AnalyzeResponse {
        analysis: output.analysis,
    })
    .into_response();
    platform::headers::apply_no_store(response.headers_mut());

    Ok(response)
}

/// POST /api/history
pub async fn append_history<R, M>(
    State(state): State<AnalysisAppState<R, M>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    body: Result<Json<AppendRequest>, JsonRejection>,
) -> AnalysisResult<Json<AppendResponse>>
where
    R: HistoryRepository + Clone + Send + Sync + 'static,
    M: AnalysisModel + Clone + Send + Sync + 'static,
{
    let Json(req) = body.map_err(|_| required_fields())?;

    let statement = req
        .statement
        .as_deref()
        .and_then(|s| Statement::parse(s, state.config.max_statement_chars).ok())
        .ok_or_else(required_fields)?;

    let analysis = req
        .analysis
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(required_fields)?;

    let service = HistoryService::new(state.repo.clone());
    let outcome = service
        .append(&owner, NewAnalysis { statement, analysis })
        .await;

    Ok(Json(AppendResponse::from_outcome(
        outcome,
        &state.config.public_base_url,
    )))
}

/// GET /api/history
pub async fn list_history<R, M>(
    State(state): State<AnalysisAppState<R, M>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AnalysisResult<Json<HistoryPageResponse>>
where
    R: HistoryRepository + Clone + Send + Sync + 'static,
    M: AnalysisModel + Clone + Send + Sync + 'static,
{
    let Query(query) =
        query.map_err(|_| AnalysisError::Validation(INVALID_PAGINATION.to_string()))?;

    let request = PageRequest::new(query.page, query.per_page, &state.config);

    let service = HistoryService::new(state.repo.clone());
    let page = service.page(&owner, request).await?;

    Ok(Json(HistoryPageResponse::from_page(
        page,
        &state.config.public_base_url,
    )))
}

fn required_fields() -> AnalysisError {
    AnalysisError::Validation(HISTORY_FIELDS_REQUIRED.to_string())
}
