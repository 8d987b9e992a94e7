//! TraceLens HTTP REST API
//!
//! Axum-based HTTP server exposing the public, project-scoped read API.
//!
//! Architecture: each endpoint has a thin axum handler that resolves the
//! caller's project and delegates to a pure inner function. The inner
//! functions are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET /health                        - health check with DB status
//! - GET /version                       - server version info
//! - GET /api/public/observations       - list observations (filters + paging)
//! - GET /api/public/observations/:id   - single observation
//! - GET /api/public/traces/:id         - trace with its observations

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracelens_core::config::ApiConfig;
use tracelens_core::observations::{self, ObservationFilter, Page};
use tracelens_core::{ObservationType, PageMeta, TracelensConfig};

use crate::auth::{self, ProjectScope};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub pool: PgPool,
    pub config: TracelensConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/api/public/observations", get(list_observations_handler))
        .route("/api/public/observations/:id", get(get_observation_handler))
        .route("/api/public/traces/:id", get(get_trace_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    pool: PgPool,
    config: TracelensConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { pool, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("TraceLens HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// Query string of `GET /api/public/observations`.
///
/// Paging values are kept as raw strings so malformed input falls back to
/// defaults instead of rejecting the request.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObservationListQuery {
    #[serde(rename = "type")]
    pub observation_type: Option<String>,
    pub trace_id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
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
}

pub fn error_body(msg: impl Into<String>) -> serde_json::Value {
    serde_json::to_value(ErrorResponse::new(msg))
        .unwrap_or_else(|_| serde_json::json!({ "status": "error" }))
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check - queries DB and returns (status_code, json_body).
pub async fn health_inner(pool: &PgPool) -> (StatusCode, serde_json::Value) {
    match tracelens_core::db::health_check(pool).await {
        Ok(pg_ver) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "postgresql": pg_ver,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                }),
            )
        }
    }
}

/// Inner version - returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "tracelens/1",
    })
}

/// Build the list filter from the raw query. An unrecognised `type` leaves
/// the request unfiltered by type.
pub fn filter_from_query(query: &ObservationListQuery) -> ObservationFilter {
    let observation_type = query
        .observation_type
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| match raw.parse::<ObservationType>() {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(value = raw, "Ignoring type filter: {}", e);
                None
            }
        });

    ObservationFilter {
        observation_type,
        trace_id: non_empty(query.trace_id.as_deref()),
        name: non_empty(query.name.as_deref()),
        user_id: non_empty(query.user_id.as_deref()),
    }
}

/// Resolve paging from the raw query against configured limits.
pub fn page_from_query(query: &ObservationListQuery, api: &ApiConfig) -> Page {
    let page = query.page.as_deref().and_then(|p| p.trim().parse().ok());
    let limit = query.limit.as_deref().and_then(|l| l.trim().parse().ok());
    Page::resolve(page, limit, api)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Inner list - returns every observation of the caller's project matching the query.
pub async fn list_observations_inner(
    pool: &PgPool,
    api: &ApiConfig,
    scope: &ProjectScope,
    query: &ObservationListQuery,
) -> (StatusCode, serde_json::Value) {
    let filter = filter_from_query(query);
    let page = page_from_query(query, api);

    match observations::list_observations(pool, &scope.project_id, &filter, page).await {
        Ok((data, total)) => {
            let meta = PageMeta::new(page.page, page.limit, total);
            (
                StatusCode::OK,
                serde_json::json!({
                    "data": data,
                    "meta": meta,
                }),
            )
        }
        Err(e) => {
            tracing::error!(project_id = %scope.project_id, error = %e, "Failed to list observations");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))
        }
    }
}

/// Inner get - a single observation from the caller's project.
pub async fn get_observation_inner(
    pool: &PgPool,
    scope: &ProjectScope,
    observation_id: &str,
) -> (StatusCode, serde_json::Value) {
    match observations::get_observation(pool, &scope.project_id, observation_id).await {
        Ok(Some(obs)) => match serde_json::to_value(obs) {
            Ok(v) => (StatusCode::OK, v),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Observation not found: {}", observation_id)),
        ),
        Err(e) => {
            tracing::error!(project_id = %scope.project_id, error = %e, "Failed to fetch observation");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))
        }
    }
}

/// Inner get - a trace and its observations from the caller's project.
pub async fn get_trace_inner(
    pool: &PgPool,
    scope: &ProjectScope,
    trace_id: &str,
) -> (StatusCode, serde_json::Value) {
    match observations::get_trace_with_observations(pool, &scope.project_id, trace_id).await {
        Ok(Some(trace)) => match serde_json::to_value(trace) {
            Ok(v) => (StatusCode::OK, v),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Trace not found: {}", trace_id)),
        ),
        Err(e) => {
            tracing::error!(project_id = %scope.project_id, error = %e, "Failed to fetch trace");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))
        }
    }
}

// ============================================================================
// Axum handler wrappers (thin - resolve scope, delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.pool).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn list_observations_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    query: Result<Query<ObservationListQuery>, QueryRejection>,
) -> axum::response::Response {
    let scope = match auth::authenticate(&state.config.auth.api_keys, &headers) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => {
            let msg = rejection.body_text();
            tracing::warn!(project_id = %scope.project_id, "Rejected observation query: {}", msg);
            return (StatusCode::BAD_REQUEST, Json(error_body(msg))).into_response();
        }
    };
    let (status, body) =
        list_observations_inner(&state.pool, &state.config.api, &scope, &query).await;
    (status, Json(body)).into_response()
}

pub async fn get_observation_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let scope = match auth::authenticate(&state.config.auth.api_keys, &headers) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    let (status, body) = get_observation_inner(&state.pool, &scope, &id).await;
    (status, Json(body)).into_response()
}

pub async fn get_trace_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let scope = match auth::authenticate(&state.config.auth.api_keys, &headers) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    let (status, body) = get_trace_inner(&state.pool, &scope, &id).await;
    (status, Json(body)).into_response()
}

// ============================================================================
// Unit Tests - pure helpers, no database required
// ============================================================================
