//! Analyze Statement Use Case
//!
//! identity → rate limit → validation → retry-wrapped upstream call →
//! formatted analysis.

use crate::application::config::AnalysisConfig;
use crate::domain::model::{AnalysisModel, UpstreamError, UpstreamErrorKind};
use crate::domain::prompt::build_analysis_prompt;
use crate::domain::services::format_analysis_result;
use crate::domain::value_objects::{OwnerId, Statement};
use crate::error::{AnalysisError, AnalysisResult};
use platform::rate_limit::{FixedWindowRateLimiter, RateLimitDecision};
use platform::retry::{RetryError, retry_with_backoff};
use std::sync::Arc;

pub const USER_TEXT_REQUIRED: &str = "User text is required";

/// Output of a successful analysis
#[derive(Debug, Clone)]
pub struct AnalyzeOutput {
    pub statement: Statement,
    pub analysis: String,
}

/// Analyze Statement Use Case
pub struct AnalyzeStatementUseCase<M>
where
    M: AnalysisModel,
{
    model: Arc<M>,
    limiter: Arc<FixedWindowRateLimiter>,
    config: Arc<AnalysisConfig>,
}

impl<M> AnalyzeStatementUseCase<M>
where
    M: AnalysisModel,
{
    pub fn new(
        model: Arc<M>,
        limiter: Arc<FixedWindowRateLimiter>,
        config: Arc<AnalysisConfig>,
    ) -> Self {
        Self {
            model,
            limiter,
            config,
        }
    }

    /// Run the whole pipeline for one request
    ///
    /// The limiter is charged before the text is looked at, so rejected
    /// bodies still count against the window.
    pub async fn execute(
        &self,
        owner: &OwnerId,
        user_text: Option<&str>,
    ) -> AnalysisResult<AnalyzeOutput> {
        if let RateLimitDecision::Denied { retry_after_secs } =
            self.limiter.check_and_record(owner.as_str())
        {
            tracing::warn!(owner_id = %owner, "Analysis rate limit exceeded");
            return Err(AnalysisError::RateLimited { retry_after_secs });
        }

        let statement = user_text
            .and_then(|text| Statement::parse(text, self.config.max_statement_chars).ok())
            .ok_or_else(|| AnalysisError::Validation(USER_TEXT_REQUIRED.to_string()))?;

        let prompt = build_analysis_prompt(&statement);
        let model = self.model.clone();

        let raw = retry_with_backoff(self.config.retry, |attempt| {
            let model = model.clone();
            let prompt = prompt.clone();
            async move {
                tracing::debug!(attempt = attempt + 1, "Calling upstream model");
                model.generate(&prompt).await
            }
        })
        .await
        .map_err(|e| self.map_retry_error(owner, e))?;

        tracing::info!(
            owner_id = %owner,
            statement_chars = statement.char_count(),
            "Statement analyzed"
        );

        Ok(AnalyzeOutput {
            statement,
            analysis: format_analysis_result(&raw),
        })
    }

    fn map_retry_error(&self, owner: &OwnerId, err: RetryError<UpstreamError>) -> AnalysisError {
        match err {
            RetryError::Aborted(e) => {
                tracing::warn!(
                    owner_id = %owner,
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e,
                    "Upstream call aborted"
                );
                match e.kind {
                    UpstreamErrorKind::RateLimited => AnalysisError::UpstreamRateLimited {
                        retry_after_secs: self.config.rate_limit.retry_after_secs,
                    },
                    UpstreamErrorKind::Access => AnalysisError::UpstreamAccess,
                    UpstreamErrorKind::Content => AnalysisError::UpstreamContent,
                    UpstreamErrorKind::Transient => AnalysisError::UpstreamExhausted {
                        attempts: 1,
                        last: e.message,
                    },
                }
            }
            RetryError::Exhausted { attempts, last } => {
                tracing::warn!(
                    owner_id = %owner,
                    attempts = attempts,
                    error = %last,
                    "Upstream attempts exhausted"
                );
                AnalysisError::UpstreamExhausted {
                    attempts,
                    last: last.message,
                }
            }
        }
    }
}
