use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ANON_KEY_VAR, BASE_URL_VAR, ConfigError};
use crate::docs::DocsAdapter;
use crate::error::ApiError;
use crate::fetcher::SpecFetchError;
use crate::ui::{SITE_TITLE, render_docs_page};

pub const DEFAULT_DOCS_PATH: &str = "/docs";

/// Routes registered next to the docs page.
const RESERVED_PATHS: &[&str] = &["/health", "/debug", "/api/spec"];

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<DocsAdapter>,
    pub docs_path: String,
}

impl AppState {
    pub fn new(adapter: Arc<DocsAdapter>, docs_path: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            adapter,
            docs_path: normalize_docs_path(docs_path)?,
        })
    }
}

/// Forces a leading slash and drops trailing ones. An empty path or `/` maps to
/// [`DEFAULT_DOCS_PATH`] since `/` redirects to the docs page.
///
/// Paths that collide with another route or carry router syntax are rejected.
pub fn normalize_docs_path(path: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDocsPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(DEFAULT_DOCS_PATH.to_string());
    }
    if let Some(c) = trimmed
        .chars()
        .find(|c| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
    {
        return Err(invalid(&format!("character {c:?} is not allowed")));
    }
    if trimmed.split('/').any(str::is_empty) {
        return Err(invalid("empty path segment"));
    }

    let normalized = format!("/{trimmed}");
    let spec_json = format!("{normalized}/spec.json");
    if RESERVED_PATHS
        .iter()
        .any(|reserved| *reserved == normalized || *reserved == spec_json)
    {
        return Err(invalid("path is used by another route"));
    }
    Ok(normalized)
}

pub fn build_router(state: AppState) -> Router {
    let docs_path = state.docs_path.clone();
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/debug", get(debug))
        .route("/api/spec", get(api_spec))
        .route(&docs_path, get(docs_page))
        .route(&format!("{docs_path}/spec.json"), get(docs_spec_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.docs_path)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let adapter = &state.adapter;
    let has_spec = adapter.has_spec().await;

    let (code, status, backend, probe_error) = match adapter.probe_backend().await {
        Ok(()) if has_spec => (StatusCode::OK, "healthy", "connected", None),
        Ok(()) => (StatusCode::OK, "degraded", "connected", None),
        Err(err @ SpecFetchError::RemoteUnreachable(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            "unreachable",
            Some(err.to_string()),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            "disconnected",
            Some(err.to_string()),
        ),
    };
    if let Some(err) = &probe_error {
        tracing::warn!("Health probe failed: {}", err);
    }

    let body = json!({
        "status": status,
        "service": SITE_TITLE,
        "timestamp": Utc::now().to_rfc3339(),
        "backend": backend,
        "backendUrl": adapter.config().base_url(),
        "hasSpec": has_spec,
        "error": probe_error,
        "lastError": adapter.last_error().await.map(|e| e.to_string()),
    });
    (code, Json(body))
}

async fn debug(State(state): State<AppState>) -> impl IntoResponse {
    let adapter = &state.adapter;
    // Only presence is reported; startup guarantees both are set.
    Json(json!({
        "environment": {
            BASE_URL_VAR: "Set",
            ANON_KEY_VAR: "Set",
            "backendUrl": adapter.config().base_url(),
            "docsPath": state.docs_path,
        },
        "cache": adapter.cache_status().await,
        "lastError": adapter.last_error().await.map(|e| e.to_string()),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn api_spec(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match state.adapter.spec().await {
        Ok(document) => Ok(Json(document)),
        Err(source) => {
            tracing::error!("API spec fetch error: {}", source);
            Err(ApiError::SpecUnavailable {
                source,
                backend_url: state.adapter.config().base_url().to_string(),
            })
        }
    }
}

async fn docs_page(State(state): State<AppState>) -> Html<String> {
    state.adapter.spawn_refresh_if_stale().await;
    let document = state.adapter.current();
    Html(render_docs_page(&document, state.adapter.config()))
}

async fn docs_spec_json(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.adapter.current())
}

/// Installs the global subscriber. `json` switches to one JSON object per line.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pica_docs=info,tower_http=info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .init();
    }
}

/// Serves until Ctrl-C.
pub async fn start_server(addr: &str, state: AppState) -> anyhow::Result<()> {
    let docs_path = state.docs_path.clone();
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Pica Loco API Documentation running on {}", local);
    tracing::info!("Visit: http://{}{}", local, docs_path);
    tracing::info!("Debug info: http://{}/debug", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
