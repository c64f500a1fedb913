//! The page source abstraction

use crate::error::Result;
use crate::types::{Cursor, Page, Selector};
use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Fetches one page of records at a time.
///
/// Implementations must be idempotent: the same cursor, page size and
/// selector yield the same page unless the underlying data changed.
/// Failures are returned as-is; retrying is the caller's decision.
#[async_trait]
pub trait PageFetcher<R>: Send + Sync {
    /// Name for logging
    fn name(&self) -> &str;

    /// Fetch the page starting at `cursor` (`None` for the first page)
    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<R>>;
}

#[async_trait]
impl<R, F> PageFetcher<R> for Arc<F>
where
    F: PageFetcher<R> + ?Sized,
    R: Send + 'static,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<R>> {
        (**self).fetch_page(cursor, page_size, selector).await
    }
}
