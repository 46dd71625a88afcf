//! Documentation server adapter.
//!
//! Keeps the best available OpenAPI document for the UI and the JSON endpoint.
//! It supports two ways of reading that document:
//!
//! - **Push**: [`DocsAdapter::current`] never blocks. A placeholder is installed at
//!   construction and swapped for the enhanced document once a fetch succeeds
//!   (see [`DocsAdapter::spawn_initial_fetch`]).
//! - **Pull**: [`DocsAdapter::spec`] returns a fresh cached document or runs a
//!   fetch/enhance/store cycle, falling back to the stale copy on failure.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pica_docs::cache::InMemorySpecCache;
//! use pica_docs::config::ServiceConfig;
//! use pica_docs::docs::DocsAdapter;
//! use pica_docs::fetcher::SupabaseClient;
//!
//! async fn example() {
//!     let config = Arc::new(
//!         ServiceConfig::new(Some("https://demo.supabase.co"), Some("anon-key")).unwrap(),
//!     );
//!     let source = Arc::new(SupabaseClient::new(config.clone()));
//!     let cache = Arc::new(InMemorySpecCache::new());
//!     let adapter = Arc::new(DocsAdapter::new(config, source, cache, Duration::from_secs(300)));
//!     adapter.spawn_initial_fetch();
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;

use crate::cache::SpecCache;
use crate::config::ServiceConfig;
use crate::enhancer::{SpecDocument, enhance};
use crate::fallback::placeholder;
use crate::fetcher::{SpecFetchError, SpecSource};

/// Cache state as reported by `/debug`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub has_cached_spec: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_seconds: Option<u64>,
    pub fresh: bool,
    pub max_age_seconds: u64,
    pub path_count: Option<usize>,
}

pub struct DocsAdapter {
    config: Arc<ServiceConfig>,
    source: Arc<dyn SpecSource>,
    cache: Arc<dyn SpecCache>,
    max_age: Duration,
    /// Document the UI reads; swapped as a whole.
    installed: watch::Sender<Arc<SpecDocument>>,
    /// Held for the duration of one fetch cycle so concurrent callers share it.
    refresh_lock: Arc<Mutex<()>>,
    /// Number of finished fetch cycles, successful or not.
    cycles: AtomicU64,
    last_error: RwLock<Option<SpecFetchError>>,
}

impl DocsAdapter {
    /// Creates the adapter with the placeholder already installed.
    pub fn new(
        config: Arc<ServiceConfig>,
        source: Arc<dyn SpecSource>,
        cache: Arc<dyn SpecCache>,
        max_age: Duration,
    ) -> Self {
        let (installed, _) = watch::channel(Arc::new(placeholder(Some(&config), None)));
        Self {
            config,
            source,
            cache,
            max_age,
            installed,
            refresh_lock: Arc::new(Mutex::new(())),
            cycles: AtomicU64::new(0),
            last_error: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The installed document. Never waits on the network.
    pub fn current(&self) -> Arc<SpecDocument> {
        self.installed.borrow().clone()
    }

    /// Receiver that observes every swap of the installed document.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SpecDocument>> {
        self.installed.subscribe()
    }

    /// Returns the cached document if fresh, otherwise fetches a new one.
    ///
    /// On fetch failure the stale cached document is returned if there is one;
    /// the error is only surfaced when nothing was ever fetched.
    pub async fn spec(&self) -> Result<Arc<SpecDocument>, SpecFetchError> {
        if let Some(document) = self.cache.get_fresh(self.max_age).await {
            tracing::debug!("Cache hit for OpenAPI spec");
            return Ok(document);
        }

        let seen = self.cycles.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;
        if self.cycles.load(Ordering::Acquire) != seen {
            // A cycle finished while we waited; share its outcome.
            if let Some(document) = self.cache.get().await {
                return Ok(document);
            }
            if let Some(err) = self.last_error().await {
                return Err(err);
            }
        }

        tracing::info!("Cache miss for OpenAPI spec. Fetching...");
        match self.refresh_locked().await {
            Ok(document) => Ok(document),
            Err(err) => match self.cache.get().await {
                Some(stale) => {
                    tracing::warn!("Serving stale OpenAPI spec after fetch failure: {}", err);
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// One fetch/enhance/store cycle. Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<Arc<SpecDocument>, SpecFetchError> {
        let outcome = self.fetch_and_install().await;
        self.cycles.fetch_add(1, Ordering::Release);
        outcome
    }

    async fn fetch_and_install(&self) -> Result<Arc<SpecDocument>, SpecFetchError> {
        match self.source.fetch().await {
            Ok(raw) => {
                let document = Arc::new(enhance(&raw, &self.config));
                self.cache.put(document.clone()).await;
                self.installed.send_replace(document.clone());
                *self.last_error.write().await = None;
                tracing::info!(
                    "OpenAPI spec enhanced and installed with {} paths",
                    document.path_count()
                );
                Ok(document)
            }
            Err(err) => {
                if self.cache.get().await.is_none() {
                    let reason = err.to_string();
                    self.installed
                        .send_replace(Arc::new(placeholder(Some(&self.config), Some(&reason))));
                }
                *self.last_error.write().await = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Schedules the first fetch in the background; the UI keeps serving the
    /// placeholder until it completes.
    pub fn spawn_initial_fetch(self: &Arc<Self>) -> JoinHandle<()> {
        let adapter = Arc::clone(self);
        tokio::spawn(async move {
            match adapter.spec().await {
                Ok(document) => tracing::info!(
                    "Documentation initialized with {} paths",
                    document.path_count()
                ),
                Err(err) => tracing::error!("Failed to initialize documentation: {}", err),
            }
        })
    }

    /// Schedules a background refresh when the cache is stale and no fetch is
    /// already running. Returns `None` when nothing was scheduled.
    pub async fn spawn_refresh_if_stale(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.cache.is_fresh(self.max_age).await {
            return None;
        }
        let guard = Arc::clone(&self.refresh_lock).try_lock_owned().ok()?;
        let adapter = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _guard = guard;
            if adapter.cache.is_fresh(adapter.max_age).await {
                return;
            }
            if let Err(err) = adapter.refresh_locked().await {
                tracing::warn!("Background refresh failed: {}", err);
            }
        }))
    }

    /// Reachability of the backend, independent of the cache.
    pub async fn probe_backend(&self) -> Result<(), SpecFetchError> {
        self.source.probe().await
    }

    pub async fn has_spec(&self) -> bool {
        self.cache.get().await.is_some()
    }

    pub async fn last_error(&self) -> Option<SpecFetchError> {
        self.last_error.read().await.clone()
    }

    pub async fn cache_status(&self) -> CacheStatus {
        let entry = self.cache.entry().await;
        CacheStatus {
            has_cached_spec: entry.is_some(),
            fetched_at: entry.as_ref().map(|e| e.fetched_at_utc),
            age_seconds: entry.as_ref().map(|e| e.age().as_secs()),
            fresh: entry.as_ref().is_some_and(|e| e.is_fresh(self.max_age)),
            max_age_seconds: self.max_age.as_secs(),
            path_count: entry.as_ref().map(|e| e.document.path_count()),
        }
    }
}
