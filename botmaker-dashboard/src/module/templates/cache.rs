///! Single-slot TTL cache in front of the template source
use super::api_client::TemplateSource;
use botmaker_common::RawTemplate;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Wall-clock source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of one fetch cycle. A failed fetch is an empty list plus the error text.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub templates: Vec<RawTemplate>,
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Memoizes the last fetch outcome for `ttl`.
///
/// Failures are cached exactly like successes. The slot lock is held across
/// the fetch, so at most one request hits the network at a time.
pub struct TemplateCache {
    source: Arc<dyn TemplateSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: Mutex<Option<Arc<FetchOutcome>>>,
}

impl TemplateCache {
    pub fn new(source: Arc<dyn TemplateSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached outcome, fetching a fresh one once it is `ttl` old.
    pub async fn get(&self) -> Arc<FetchOutcome> {
        let mut slot = self.slot.lock().await;
        let now = self.clock.now();

        if let Some(cached) = slot.as_ref() {
            if self.is_fresh(cached.fetched_at, now) {
                debug!("Template cache hit (fetched at {})", cached.fetched_at);
                return cached.clone();
            }
            debug!("Template cache expired (fetched at {})", cached.fetched_at);
        }

        let outcome = Arc::new(self.fetch(now).await);
        *slot = Some(outcome.clone());
        outcome
    }

    /// Drop the cached outcome so the next `get` refetches.
    pub async fn invalidate(&self) {
        if self.slot.lock().await.take().is_some() {
            info!("Template cache invalidated");
        }
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - fetched_at).to_std() {
            Ok(elapsed) => elapsed < self.ttl,
            // clock went backwards
            Err(_) => true,
        }
    }

    async fn fetch(&self, now: DateTime<Utc>) -> FetchOutcome {
        match self.source.fetch_templates().await {
            Ok(templates) => {
                info!("Loaded {} templates", templates.len());
                FetchOutcome {
                    templates,
                    error: None,
                    fetched_at: now,
                }
            }
            Err(e) => {
                error!("Failed to fetch templates: {}", e);
                FetchOutcome {
                    templates: Vec::new(),
                    error: Some(e.to_string()),
                    fetched_at: now,
                }
            }
        }
    }
}
