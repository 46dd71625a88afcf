use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::fetcher::SpecFetchError;

/// Errors surfaced by the HTTP handlers as JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to fetch OpenAPI specification")]
    SpecUnavailable {
        source: SpecFetchError,
        backend_url: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrBody {
    error: String,
    kind: &'static str,
    details: String,
    backend_url: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::SpecUnavailable {
                ref source,
                ref backend_url,
            } => {
                let body = ErrBody {
                    error: self.to_string(),
                    kind: source.kind(),
                    details: source.to_string(),
                    backend_url: backend_url.clone(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
