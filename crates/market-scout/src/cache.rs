//! Listing cache: one time-bounded slot for the general listing.
//!
//! ## Freshness
//!
//! The slot is fresh while `now - stored < ttl`. A stale or empty slot is
//! refreshed by running a scrape cycle; the new batch replaces the old one
//! wholesale with a single pointer swap, so readers never see partial data.
//!
//! ## Keyword searches
//!
//! Searches bypass the slot and always run their own live cycle.
//!
//! ## Cancellation
//!
//! Every cycle runs on its own task. Dropping a caller's future only stops
//! the wait; the cycle finishes and a general refresh still fills the slot.
//!
//! ## Failures
//!
//! Scrape failures never reach the caller. They turn into an empty batch,
//! or into the previous batch when `keep_stale_on_failure` is set.

use crate::config::ScoutConfig;
use crate::pipeline::Scraper;
use crate::types::ExtractionBatch;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lifecycle of the cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

/// Snapshot of the slot for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub state: CacheState,
    pub records: usize,
    pub captured_at: Option<DateTime<Utc>>,
    pub age: Option<Duration>,
    pub ttl: Duration,
}

/// Stored batch with its monotonic capture time.
struct CacheEntry {
    batch: Arc<ExtractionBatch>,
    stored: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored.elapsed() < ttl
    }
}

/// Decrements the in-flight counter when a refresh ends, however it ends.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cache in front of a [`Scraper`].
///
/// Scrape cycles run on spawned tasks: a caller that stops waiting does
/// not cancel the cycle, and its result is still stored. Cloning is cheap
/// and shares the slot.
#[derive(Clone)]
pub struct ListingCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    scraper: Scraper,
    ttl: Duration,
    keep_stale_on_failure: bool,
    single_flight: bool,
    slot: RwLock<Option<Arc<CacheEntry>>>,
    /// Serialises general refreshes in single-flight mode.
    gate: Mutex<()>,
    in_flight: AtomicUsize,
    cycles: AtomicU64,
}

impl ListingCache {
    pub fn new(scraper: Scraper, config: &ScoutConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                scraper,
                ttl: config.cache_ttl(),
                keep_stale_on_failure: config.keep_stale_on_failure,
                single_flight: config.single_flight,
                slot: RwLock::new(None),
                gate: Mutex::new(()),
                in_flight: AtomicUsize::new(0),
                cycles: AtomicU64::new(0),
            }),
        }
    }

    /// General listing for `None`, a live keyword search for `Some`.
    pub async fn get(&self, keyword: Option<&str>) -> Arc<ExtractionBatch> {
        match keyword {
            Some(kw) => self.search(kw).await,
            None => self.listings().await,
        }
    }

    /// The general listing, refreshed first when stale or empty.
    pub async fn listings(&self) -> Arc<ExtractionBatch> {
        if let Some(entry) = self.inner.fresh_entry() {
            tracing::debug!("cache hit: {} listings", entry.batch.len());
            return Arc::clone(&entry.batch);
        }

        let inner = Arc::clone(&self.inner);
        match tokio::spawn(async move { inner.refresh_when_stale().await }).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!("refresh task failed: {e}");
                self.inner
                    .current()
                    .map(|entry| Arc::clone(&entry.batch))
                    .unwrap_or_else(|| Arc::new(ExtractionBatch::empty()))
            }
        }
    }

    /// Like [`listings`](Self::listings), but returns a stale batch at once
    /// when a refresh is already running instead of waiting for it.
    pub async fn get_or_stale(&self) -> Arc<ExtractionBatch> {
        if let Some(entry) = self.inner.current() {
            if entry.is_fresh(self.inner.ttl) || self.in_flight() > 0 {
                return Arc::clone(&entry.batch);
            }
        }
        self.listings().await
    }

    /// Run a live scrape scoped to `keyword`. Never cached.
    pub async fn search(&self, keyword: &str) -> Arc<ExtractionBatch> {
        let inner = Arc::clone(&self.inner);
        let kw = keyword.to_string();
        match tokio::spawn(async move { inner.search(&kw).await }).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!("search task for {keyword:?} failed: {e}");
                Arc::new(ExtractionBatch::empty())
            }
        }
    }

    /// Drop the cached batch; the next read refreshes.
    pub fn invalidate(&self) {
        *self.inner.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn status(&self) -> CacheStatus {
        let ttl = self.inner.ttl;
        match self.inner.current() {
            None => CacheStatus {
                state: CacheState::Empty,
                records: 0,
                captured_at: None,
                age: None,
                ttl,
            },
            Some(entry) => CacheStatus {
                state: if entry.is_fresh(ttl) {
                    CacheState::Fresh
                } else {
                    CacheState::Stale
                },
                records: entry.batch.len(),
                captured_at: Some(entry.batch.captured_at),
                age: Some(entry.stored.elapsed()),
                ttl,
            },
        }
    }

    /// Scrape cycles started so far, general and search.
    pub fn cycles(&self) -> u64 {
        self.inner.cycles.load(Ordering::SeqCst)
    }

    /// Refreshes currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    pub fn scraper(&self) -> &Scraper {
        &self.inner.scraper
    }
}

impl CacheInner {
    async fn refresh_when_stale(&self) -> Arc<ExtractionBatch> {
        if !self.single_flight {
            return self.refresh().await;
        }

        let _gate = self.gate.lock().await;
        // Another cycle may have finished while we waited.
        if let Some(entry) = self.fresh_entry() {
            tracing::debug!("cache filled by concurrent refresh");
            return Arc::clone(&entry.batch);
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Arc<ExtractionBatch> {
        let _in_flight = InFlight::start(&self.in_flight);
        self.cycles.fetch_add(1, Ordering::SeqCst);

        match self.scraper.scrape(None).await {
            Ok(batch) => self.store(batch),
            Err(e) => {
                if !self.keep_stale_on_failure {
                    tracing::warn!("refresh failed, caching empty batch: {e}");
                    return self.store(ExtractionBatch::empty());
                }
                match self.current() {
                    Some(previous) => {
                        tracing::warn!(
                            "refresh failed, keeping previous batch of {} listings: {e}",
                            previous.batch.len()
                        );
                        Arc::clone(&previous.batch)
                    }
                    None => {
                        tracing::warn!("refresh failed with nothing cached: {e}");
                        Arc::new(ExtractionBatch::empty())
                    }
                }
            }
        }
    }

    async fn search(&self, keyword: &str) -> Arc<ExtractionBatch> {
        self.cycles.fetch_add(1, Ordering::SeqCst);
        match self.scraper.scrape(Some(keyword)).await {
            Ok(batch) => Arc::new(batch),
            Err(e) => {
                tracing::warn!("search for {keyword:?} failed: {e}");
                Arc::new(ExtractionBatch::empty())
            }
        }
    }

    fn store(&self, batch: ExtractionBatch) -> Arc<ExtractionBatch> {
        let batch = Arc::new(batch);
        let entry = Arc::new(CacheEntry {
            batch: Arc::clone(&batch),
            stored: Instant::now(),
        });
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(entry);
        batch
    }

    fn current(&self) -> Option<Arc<CacheEntry>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn fresh_entry(&self) -> Option<Arc<CacheEntry>> {
        self.current().filter(|e| e.is_fresh(self.ttl))
    }
}
