//! First-page cache in front of any page source.
//!
//! Switching back to a tab that was already visited can reuse the first page
//! instead of waiting on the source again. Only first pages are cached:
//! continuation pages depend on what the source returned before them and
//! always go to the source.

use crate::error::Result;
use crate::traits::PageFetcher;
use crate::types::{Cursor, Page, Selector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How long a cached first page may be reused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Staleness {
    /// Cached pages are stale immediately; every request reaches the source
    #[default]
    Always,
    /// Reuse a cached page for this many seconds
    AfterSecs(u64),
    /// Reuse a cached page until it is invalidated
    Never,
}

impl Staleness {
    pub fn is_fresh(&self, age: Duration) -> bool {
        match self {
            Staleness::Always => false,
            Staleness::AfterSecs(secs) => age < Duration::from_secs(*secs),
            Staleness::Never => true,
        }
    }
}

struct CachedPage<R> {
    page: Page<R>,
    fetched_at: Instant,
}

type CacheKey = (Selector, NonZeroUsize);

/// Wraps a fetcher and serves repeated first-page requests from memory
pub struct CachedFetcher<F, R> {
    inner: F,
    staleness: Staleness,
    entries: Mutex<HashMap<CacheKey, CachedPage<R>>>,
}

impl<F, R> CachedFetcher<F, R> {
    pub fn new(inner: F, staleness: Staleness) -> Self {
        Self {
            inner,
            staleness,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn staleness(&self) -> Staleness {
        self.staleness
    }

    /// Drop every cached page
    pub fn invalidate(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached first pages
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F, R: Clone> CachedFetcher<F, R> {
    /// Expired pages for every selector are dropped on the way, so the
    /// cache only ever holds pages that could still be served.
    fn lookup(&self, key: &CacheKey) -> Option<Page<R>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, cached| self.staleness.is_fresh(cached.fetched_at.elapsed()));
        if entries.len() < before {
            debug!(evicted = before - entries.len(), "Dropped expired first pages");
        }
        entries.get(key).map(|cached| cached.page.clone())
    }

    fn store(&self, key: CacheKey, page: &Page<R>) {
        if self.staleness == Staleness::Always {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key,
                CachedPage {
                    page: page.clone(),
                    fetched_at: Instant::now(),
                },
            );
    }
}

#[async_trait]
impl<F, R> PageFetcher<R> for CachedFetcher<F, R>
where
    F: PageFetcher<R>,
    R: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<R>> {
        if cursor.is_some() {
            return self.inner.fetch_page(cursor, page_size, selector).await;
        }

        let key = (selector.clone(), page_size);
        if let Some(page) = self.lookup(&key) {
            debug!(source = self.inner.name(), %selector, "First page served from cache");
            return Ok(page);
        }

        let page = self.inner.fetch_page(None, page_size, selector).await?;
        self.store(key, &page);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and returns the cursor offset as the only record
    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PageFetcher<u64> for CountingFetcher {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_page(
            &self,
            cursor: Option<Cursor>,
            _page_size: NonZeroUsize,
            _selector: &Selector,
        ) -> Result<Page<u64>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            if self.fail {
                return Err(FetchError::Unavailable("offline".to_string()));
            }
            Ok(Page::new(
                vec![cursor.map_or(0, Cursor::offset), call],
                Some(Cursor(10)),
            ))
        }
    }

    fn size() -> NonZeroUsize {
        NonZeroUsize::new(10).unwrap()
    }

    #[tokio::test]
    async fn test_always_stale_never_caches() {
        let cached = CachedFetcher::<_, u64>::new(CountingFetcher::new(), Staleness::Always);
        let selector = Selector::category("plants");

        cached.fetch_page(None, size(), &selector).await.unwrap();
        cached.fetch_page(None, size(), &selector).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }

    #[tokio::test]
    async fn test_never_stale_reuses_first_page_per_selector() {
        let cached = CachedFetcher::<_, u64>::new(CountingFetcher::new(), Staleness::Never);
        let plants = Selector::category("plants");
        let tools = Selector::category("tools");

        let first = cached.fetch_page(None, size(), &plants).await.unwrap();
        let again = cached.fetch_page(None, size(), &plants).await.unwrap();
        cached.fetch_page(None, size(), &tools).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);

        cached.invalidate();
        cached.fetch_page(None, size(), &plants).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_continuation_pages_bypass_cache() {
        let cached = CachedFetcher::<_, u64>::new(CountingFetcher::new(), Staleness::Never);
        let selector = Selector::all();

        cached.fetch_page(Some(Cursor(10)), size(), &selector).await.unwrap();
        cached.fetch_page(Some(Cursor(10)), size(), &selector).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_secs_expires() {
        let cached =
            CachedFetcher::<_, u64>::new(CountingFetcher::new(), Staleness::AfterSecs(60));
        let selector = Selector::all();

        cached.fetch_page(None, size(), &selector).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        cached.fetch_page(None, size(), &selector).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        cached.fetch_page(None, size(), &selector).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_pages_are_evicted() {
        let cached =
            CachedFetcher::<_, u64>::new(CountingFetcher::new(), Staleness::AfterSecs(60));
        let plants = Selector::category("plants");
        let tools = Selector::category("tools");

        cached.fetch_page(None, size(), &plants).await.unwrap();
        cached.fetch_page(None, size(), &tools).await.unwrap();
        assert_eq!(cached.len(), 2);

        // tools is never asked for again, but its expired page still goes
        tokio::time::advance(Duration::from_secs(61)).await;
        cached.fetch_page(None, size(), &plants).await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mut inner = CountingFetcher::new();
        inner.fail = true;
        let cached = CachedFetcher::<_, u64>::new(inner, Staleness::Never);

        let result = cached.fetch_page(None, size(), &Selector::all()).await;

        assert!(matches!(result, Err(FetchError::Unavailable(_))));
        assert!(cached.is_empty());
    }

    #[test]
    fn test_staleness_serde_names() {
        let parsed: Staleness = serde_json::from_str(r#"{"after_secs": 600}"#).unwrap();
        assert_eq!(parsed, Staleness::AfterSecs(600));
        let parsed: Staleness = serde_json::from_str(r#""never""#).unwrap();
        assert_eq!(parsed, Staleness::Never);
    }
}
