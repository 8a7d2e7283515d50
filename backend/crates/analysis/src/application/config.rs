//! Application Configuration
//!
//! Configuration for the analysis application layer.

use crate::domain::value_objects::STATEMENT_MAX_CHARS;
use platform::config::{ConfigError, Env};
use platform::rate_limit::RateLimitConfig;
use platform::retry::RetryPolicy;
use std::time::Duration;

/// Analysis application configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Per-identity limit on the analysis endpoint
    pub rate_limit: RateLimitConfig,
    /// Upstream retry policy
    pub retry: RetryPolicy,
    /// Statements are truncated to this many characters
    pub max_statement_chars: usize,
    /// History page size when the client does not ask for one
    pub default_page_size: u32,
    /// Upper bound on the requested page size
    pub max_page_size: u32,
    /// Cookie carrying the identity token
    pub session_cookie_name: String,
    /// Base URL quoted in share copy
    pub public_base_url: String,
    /// How often expired rate-limit records are swept
    pub sweep_interval: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            retry: RetryPolicy::default(),
            max_statement_chars: STATEMENT_MAX_CHARS,
            default_page_size: 10,
            max_page_size: 50,
            session_cookie_name: "__session".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl AnalysisConfig {
    /// Build from the environment; only `PUBLIC_BASE_URL` is required
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let base = Self::default();

        Ok(Self {
            public_base_url: env.required("PUBLIC_BASE_URL")?,
            session_cookie_name: env.or_default("SESSION_COOKIE_NAME", &base.session_cookie_name),
            ..base
        })
    }
}
