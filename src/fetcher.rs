use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::enhancer::SpecDocument;

/// Longest slice of a rejected response body kept in errors and logs.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpecFetchError {
    #[error("Backend rejected the request with status {status}{}", body_suffix(.body))]
    RemoteRejected { status: u16, body: Option<String> },

    #[error("Backend unreachable: {0}")]
    RemoteUnreachable(String),

    #[error("Malformed response from backend: {0}")]
    MalformedResponse(String),
}

impl SpecFetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            SpecFetchError::RemoteRejected { .. } => "RemoteRejected",
            SpecFetchError::RemoteUnreachable(_) => "RemoteUnreachable",
            SpecFetchError::MalformedResponse(_) => "MalformedResponse",
        }
    }
}

pub type FetchOutcome = Result<SpecDocument, SpecFetchError>;

/// Where the raw document comes from.
#[async_trait]
pub trait SpecSource: Send + Sync {
    /// One outbound request for the raw document. No retries.
    async fn fetch(&self) -> FetchOutcome;

    /// Cheap reachability check; succeeds on any 2xx answer.
    async fn probe(&self) -> Result<(), SpecFetchError>;
}

/// Reads the PostgREST-generated OpenAPI document from a Supabase project.
pub struct SupabaseClient {
    client: Client,
    config: Arc<ServiceConfig>,
}

impl SupabaseClient {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Same as [`SupabaseClient::new`] but every request gives up after `timeout`.
    pub fn with_timeout(
        config: Arc<ServiceConfig>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    fn spec_url(&self) -> String {
        format!("{}/", self.config.rest_url())
    }

    async fn send(&self) -> Result<Response, SpecFetchError> {
        let key = self.config.anon_key();
        let response = self
            .client
            .get(self.spec_url())
            .query(&[("apikey", key)])
            .header("apikey", key)
            .bearer_auth(key)
            .header("Accept", "application/openapi+json, application/json")
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .ok()
                .filter(|b| !b.is_empty())
                .map(|b| truncate(&self.config.redact(&b), MAX_ERROR_BODY_CHARS));
            return Err(SpecFetchError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    fn unreachable(&self, err: reqwest::Error) -> SpecFetchError {
        // The request URL carries the credential in its query string.
        SpecFetchError::RemoteUnreachable(self.config.redact(&err.without_url().to_string()))
    }
}

#[async_trait]
impl SpecSource for SupabaseClient {
    async fn fetch(&self) -> FetchOutcome {
        tracing::info!("Fetching spec from: {}?apikey=***", self.spec_url());

        let response = match self.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(kind = err.kind(), "Failed to fetch OpenAPI spec: {}", err);
                return Err(err);
            }
        };
        tracing::debug!("Backend response status: {}", response.status());

        let text = response.text().await.map_err(|e| self.unreachable(e))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| SpecFetchError::MalformedResponse(e.to_string()))?;
        let document = SpecDocument::from_value(value).ok_or_else(|| {
            SpecFetchError::MalformedResponse("expected a JSON object at the top level".into())
        })?;

        tracing::info!("Spec received with {} paths", document.path_count());
        Ok(document)
    }

    async fn probe(&self) -> Result<(), SpecFetchError> {
        self.send().await.map(|_| ())
    }
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref().map(|b| format!(": {b}")).unwrap_or_default()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
