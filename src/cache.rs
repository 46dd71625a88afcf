use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::enhancer::SpecDocument;

/// The last successfully enhanced document and when it was stored.
#[derive(Debug)]
pub struct CacheEntry {
    pub document: Arc<SpecDocument>,
    /// Monotonic stamp used for freshness checks.
    pub fetched_at: Instant,
    /// Wall-clock stamp for reporting.
    pub fetched_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.age() < max_age
    }
}

/// Trait for a single-document cache.
#[async_trait]
pub trait SpecCache: Send + Sync {
    /// True iff an entry exists and is younger than `max_age`.
    async fn is_fresh(&self, max_age: Duration) -> bool;
    async fn get(&self) -> Option<Arc<SpecDocument>>;
    /// The cached document, only if it is younger than `max_age`.
    async fn get_fresh(&self, max_age: Duration) -> Option<Arc<SpecDocument>>;
    /// Replaces the entry as a whole and stamps the current time.
    async fn put(&self, document: Arc<SpecDocument>);
    async fn entry(&self) -> Option<Arc<CacheEntry>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySpecCache {
    entry: Arc<RwLock<Option<Arc<CacheEntry>>>>,
}

impl InMemorySpecCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpecCache for InMemorySpecCache {
    async fn is_fresh(&self, max_age: Duration) -> bool {
        self.entry
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| entry.is_fresh(max_age))
    }

    async fn get(&self) -> Option<Arc<SpecDocument>> {
        self.entry
            .read()
            .await
            .as_ref()
            .map(|entry| entry.document.clone())
    }

    async fn get_fresh(&self, max_age: Duration) -> Option<Arc<SpecDocument>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh(max_age))
            .map(|entry| entry.document.clone())
    }

    async fn put(&self, document: Arc<SpecDocument>) {
        let entry = Arc::new(CacheEntry {
            document,
            fetched_at: Instant::now(),
            fetched_at_utc: Utc::now(),
        });
        *self.entry.write().await = Some(entry);
        tracing::debug!("Spec cache updated");
    }

    async fn entry(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().await.clone()
    }
}
