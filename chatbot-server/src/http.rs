//! Platform HTTP REST API
//!
//! Axum server exposing liveness and read-only diagnostic endpoints over the
//! tenant data model. Each endpoint is a thin axum handler over an inner
//! function that returns `(StatusCode, serde_json::Value)`, so the inner
//! functions can be tested without going through the router.
//!
//! Endpoints:
//! - GET /                          banner with version and health path
//! - GET /api/health                liveness payload
//! - GET /api/test                  API running check
//! - GET /api/test/version          API version info
//! - GET /api/test/clients          live clients
//! - GET /api/test/chatbots         live chatbots
//! - GET /api/test/users            users
//! - GET /api/test/database-status  connectivity plus per-table row counts

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chatbot_core::{repo, PlatformConfig, Visibility};
use serde::Serialize;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

pub const API_VERSION: &str = "1.0.0";
pub const API_NAME: &str = "chatbot-platform-api";
pub const SERVICE_NAME: &str = "Chatbot Platform API";

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub pool: PgPool,
    pub config: PlatformConfig,
}

pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .route("/api/test", get(test_handler))
        .route("/api/test/version", get(version_handler))
        .route("/api/test/clients", get(clients_handler))
        .route("/api/test/chatbots", get(chatbots_handler))
        .route("/api/test/users", get(users_handler))
        .route("/api/test/database-status", get(database_status_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    pool: PgPool,
    config: PlatformConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { pool, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Chatbot API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }

    fn into_value(self) -> serde_json::Value {
        serde_json::json!({ "error": self.error, "status": self.status })
    }
}

fn server_error(msg: impl Into<String>) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new(msg).into_value(),
    )
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

pub fn root_inner() -> serde_json::Value {
    serde_json::json!({
        "message": format!("{} is running!", SERVICE_NAME),
        "version": API_VERSION,
        "health": "/api/health",
    })
}

pub fn health_inner(config: &PlatformConfig) -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": API_VERSION,
        "service": SERVICE_NAME,
        "environment": config.service.environment,
    })
}

pub fn test_inner(config: &PlatformConfig) -> serde_json::Value {
    tracing::info!("Test endpoint called");
    serde_json::json!({
        "message": format!("{} is running!", SERVICE_NAME),
        "timestamp": chrono::Utc::now(),
        "environment": config.service.environment,
    })
}

pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": API_VERSION,
        "crate_version": env!("CARGO_PKG_VERSION"),
        "api_name": API_NAME,
    })
}

/// Serializes a list query, or renders its failure as a generic 500.
fn rows_response<T: Serialize>(
    what: &str,
    rows: chatbot_core::Result<Vec<T>>,
) -> (StatusCode, serde_json::Value) {
    let rows = match rows {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to list {}: {}", what, e);
            return server_error(e.to_string());
        }
    };
    match serde_json::to_value(rows) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => server_error(format!("failed to serialize {}: {}", what, e)),
    }
}

pub async fn clients_inner(pool: &PgPool) -> (StatusCode, serde_json::Value) {
    rows_response("clients", repo::clients::list(pool, Visibility::Live).await)
}

pub async fn chatbots_inner(pool: &PgPool) -> (StatusCode, serde_json::Value) {
    rows_response("chatbots", repo::chatbots::list(pool, Visibility::Live).await)
}

pub async fn users_inner(pool: &PgPool) -> (StatusCode, serde_json::Value) {
    rows_response("users", repo::users::list(pool).await)
}

/// 503 when the store is unreachable, 500 if counting fails after connecting.
pub async fn database_status_inner(pool: &PgPool) -> (StatusCode, serde_json::Value) {
    let pg_ver = match chatbot_core::db::health_check(pool).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Database status check failed: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "connected": false,
                    "status": "error",
                    "error": e.to_string(),
                }),
            );
        }
    };

    let counts = match chatbot_core::db::entity_counts(pool).await {
        Ok(c) => c,
        Err(e) => return server_error(e.to_string()),
    };
    let counts: serde_json::Map<String, serde_json::Value> = counts
        .into_iter()
        .map(|(entity, n)| (entity.table().to_string(), serde_json::json!(n)))
        .collect();

    (
        StatusCode::OK,
        serde_json::json!({
            "connected": true,
            "postgresql": pg_ver,
            "counts": counts,
        }),
    )
}

// ============================================================================
// Thin axum handlers
// ============================================================================

pub async fn root_handler() -> impl IntoResponse {
    Json(root_inner())
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(health_inner(&state.config))
}

pub async fn test_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(test_inner(&state.config))
}

pub async fn version_handler() -> impl IntoResponse {
    Json(version_inner())
}

pub async fn clients_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = clients_inner(&state.pool).await;
    (status, Json(body))
}

pub async fn chatbots_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = chatbots_inner(&state.pool).await;
    (status, Json(body))
}

pub async fn users_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = users_inner(&state.pool).await;
    (status, Json(body))
}

pub async fn database_status_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = database_status_inner(&state.pool).await;
    (status, Json(body))
}
