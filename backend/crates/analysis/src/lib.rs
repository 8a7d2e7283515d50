//! Cognitive-bias Analysis Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, text processing, prompt, traits
//! - `application/` - Use cases (analyze, history)
//! - `infra/` - PostgreSQL store handles and repository, Gemini client
//! - `presentation/` - HTTP handlers, middleware, router
//!
//! ## Request Model
//! - Identity comes from a signed token minted by the external identity provider
//! - Each identity gets a fixed window of analysis requests, checked before the model is called
//! - Upstream calls are retried with exponential backoff; only transient failures are retried
//! - History writes never fail the request; history reads do

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use infra::gemini::{GeminiClient, GeminiSettings};
pub use infra::postgres::PgHistoryRepository;
pub use infra::store::{StoreHandles, StoreSettings};
pub use presentation::router::{analysis_router, analysis_router_generic};
