//! Catalog Source - pages served from the in-memory catalog
//!
//! Stands in for the remote database during development and tests. Records
//! are returned in fixture order, which is the order the remote query
//! returns them in.
//!
//! ## Algorithm
//! 1. Resolve the candidate positions (category index, or every record)
//! 2. Drop records that do not contain the selector keyword
//! 3. Slice `[offset, offset + page_size)` out of what is left
//! 4. Hand back `offset + len` as the next cursor while records remain

use crate::error::{FetchError, Result};
use crate::traits::PageFetcher;
use crate::types::{Cursor, Page, Selector};
use async_trait::async_trait;
use catalog::{Catalog, CatalogRecord};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Serves pages of items or posts out of a shared [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogSource {
    /// Shared reference to the loaded catalog (read-only, so no Mutex needed)
    catalog: Arc<Catalog>,

    /// Artificial delay before every response
    latency: Option<Duration>,
}

impl CatalogSource {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            latency: None,
        }
    }

    /// Delay every response by `latency`, to make in-flight windows visible
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Build the page synchronously
    pub fn page_of<R: CatalogRecord>(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<R>> {
        let stored = R::stored(&self.catalog);

        let mut matching: Vec<&R> = match &selector.category {
            Some(category) => R::category_positions(&self.catalog, category)
                .iter()
                .map(|&position| &stored[position])
                .collect(),
            None => stored.iter().collect(),
        };
        if let Some(keyword) = &selector.keyword {
            matching.retain(|record| record.matches_keyword(keyword));
        }

        let offset = cursor.map_or(0, Cursor::offset);
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start > matching.len() {
            return Err(FetchError::InvalidCursor {
                cursor: Cursor(offset),
                selector: selector.to_string(),
            });
        }

        let end = start.saturating_add(page_size.get()).min(matching.len());
        let items: Vec<R> = matching[start..end].iter().map(|&r| r.clone()).collect();
        let next_cursor = (end < matching.len()).then(|| Cursor(end as u64));

        Ok(Page::new(items, next_cursor))
    }
}

#[async_trait]
impl<R: CatalogRecord> PageFetcher<R> for CatalogSource {
    fn name(&self) -> &str {
        "catalog"
    }

    #[instrument(skip(self, selector), fields(kind = R::KIND, selector = %selector))]
    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<R>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let page = self.page_of::<R>(cursor, page_size, selector)?;
        debug!(
            "Served {} {} records (next cursor: {:?})",
            page.len(),
            R::KIND,
            page.next_cursor
        );
        Ok(page)
    }
}
