//! Analysis Router

use crate::application::config::AnalysisConfig;
use crate::domain::model::AnalysisModel;
use crate::domain::repository::HistoryRepository;
use crate::infra::gemini::GeminiClient;
use crate::infra::postgres::PgHistoryRepository;
use crate::presentation::handlers::{self, AnalysisAppState};
use crate::presentation::middleware::{IdentityState, require_identity, security_headers};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::identity::IdentityVerifier;
use std::sync::Arc;

/// Create the analysis router with PostgreSQL history and the Gemini model
///
/// Returns the router together with its state so the caller can reach the
/// limiter (sweeper task).
pub fn analysis_router(
    repo: PgHistoryRepository,
    model: GeminiClient,
    verifier: IdentityVerifier,
    config: AnalysisConfig,
) -> (Router, AnalysisAppState<PgHistoryRepository, GeminiClient>) {
    let state = AnalysisAppState::new(repo, model, config);
    let router = analysis_router_generic(state.clone(), verifier);
    (router, state)
}

/// Create a generic analysis router for any repository / model implementation
pub fn analysis_router_generic<R, M>(
    state: AnalysisAppState<R, M>,
    verifier: IdentityVerifier,
) -> Router
where
    R: HistoryRepository + Clone + Send + Sync + 'static,
    M: AnalysisModel + Clone + Send + Sync + 'static,
{
    let identity = IdentityState {
        verifier: Arc::new(verifier),
        cookie_name: Arc::from(state.config.session_cookie_name.as_str()),
    };

    Router::new()
        .route("/analyze", post(handlers::analyze::<R, M>))
        .route(
            "/history",
            get(handlers::list_history::<R, M>).post(handlers::append_history::<R, M>),
        )
        .route_layer(middleware::from_fn_with_state(identity, require_identity))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}
