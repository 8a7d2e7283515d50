//! Analysis Middleware

use crate::domain::value_objects::OwnerId;
use crate::error::AnalysisError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::identity::IdentityVerifier;
use std::sync::Arc;

/// Middleware state
#[derive(Clone)]
pub struct IdentityState {
    pub verifier: Arc<IdentityVerifier>,
    pub cookie_name: Arc<str>,
}

/// Verified identity stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub OwnerId);

/// Middleware that requires a verified identity token
pub async fn require_identity(
    State(state): State<IdentityState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AnalysisError> {
    let owner = platform::cookie::extract_credential(req.headers(), &state.cookie_name)
        .and_then(|token| state.verifier.verify(&token))
        .and_then(|subject| OwnerId::new(&subject).ok());

    let Some(owner) = owner else {
        tracing::debug!(path = %req.uri().path(), "Request without a valid identity");
        return Err(AnalysisError::Unauthorized);
    };

    req.extensions_mut().insert(CurrentUser(owner));

    Ok(next.run(req).await)
}

/// Stamp JSON / nosniff / DENY headers on every response
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    platform::headers::apply_security_headers(response.headers_mut());
    response
}
