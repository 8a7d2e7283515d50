//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors go through
//! `analysis::AnalysisError`.

use analysis::{
    AnalysisConfig, GeminiClient, GeminiSettings, PgHistoryRepository, StoreHandles,
    StoreSettings, analysis_router,
};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use chrono::{DateTime, Utc};
use platform::config::Env;
use platform::identity::IdentityVerifier;
use platform::rate_limit::spawn_sweeper;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

fn cors_layer(env: &Env) -> CorsLayer {
    let mut origins = env.list("FRONTEND_ORIGINS");
    if origins.is_empty() {
        origins = DEFAULT_FRONTEND_ORIGINS
            .split(',')
            .map(str::to_string)
            .collect();
    }

    let allowed_origins: Vec<http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,analysis=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = Env::process();

    let config = AnalysisConfig::from_env(&env)?;
    let gemini_settings = GeminiSettings::from_env(&env)?;
    let store_settings = StoreSettings::from_env(&env)?;
    let identity_secret = env.required("IDENTITY_TOKEN_SECRET")?;
    let port: u16 = env.parse_or("PORT", DEFAULT_PORT)?;

    // Database pools are created on first use; migrations force the
    // elevated one up front
    let store = Arc::new(StoreHandles::new(store_settings));
    let service_pool = store.service().await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(service_pool)
        .await?;

    tracing::info!("Migrations completed");

    let model = GeminiClient::new(gemini_settings)?;
    let repo = PgHistoryRepository::new(store.clone());
    let sweep_interval = config.sweep_interval;

    let (analysis, state) = analysis_router(
        repo,
        model,
        IdentityVerifier::new(identity_secret),
        config,
    );

    // Evict elapsed rate-limit windows in the background
    let _sweeper = spawn_sweeper(state.limiter.clone(), sweep_interval);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", analysis)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&env)),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_serializes_rfc3339_timestamp() {
        let Json(body) = health().await;
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["status"], "healthy");
        let timestamp = value["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
