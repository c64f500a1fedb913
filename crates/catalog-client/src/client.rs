//! gRPC page source for the remote catalog service

use crate::convert::{item_from_proto, post_from_proto, request_to_proto};
use crate::error::CatalogClientError;
use crate::proto::catalog_service_client::CatalogServiceClient as GrpcCatalogClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog::{Item, Post};
use sources::{Cursor, Page, PageFetcher, Selector};
use std::num::NonZeroUsize;
use std::time::Duration;
use tonic::transport::Channel;
use tracing::{debug, error, info, instrument};

/// Client for the catalog service.
///
/// Wraps the generated gRPC client and checks every page it gets back
/// before handing it to a list controller. The generated client is cheap to
/// clone, so each request works on its own copy and `&self` is enough.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: GrpcCatalogClient<Channel>,
    service_addr: String,
    timeout: Option<Duration>,
}

impl CatalogClient {
    /// Connect to the catalog service.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50061")
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        info!("Connecting to catalog service at {}", addr);

        let channel = Channel::from_shared(addr.clone())
            .context("Creating channel from address")?
            .connect()
            .await
            .context("Connecting to catalog service")?;

        Ok(CatalogClient {
            client: GrpcCatalogClient::new(channel),
            service_addr: addr,
            timeout: None,
        })
    }

    /// Give up on any single page request after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the address of the catalog service this client is connected to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }

    fn request(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> tonic::Request<crate::proto::PageRequest> {
        let mut request = tonic::Request::new(request_to_proto(cursor, page_size, selector));
        if let Some(timeout) = self.timeout {
            request.set_timeout(timeout);
        }
        request
    }

    /// Fetch one page of shop items
    pub async fn fetch_items(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<Item>, CatalogClientError> {
        let response = self
            .client
            .clone()
            .fetch_items(self.request(cursor, page_size, selector))
            .await
            .map_err(|status| {
                error!("gRPC error while fetching items: {}", status);
                CatalogClientError::RequestError(status)
            })?
            .into_inner();

        let next_cursor =
            check_page(cursor, page_size, response.items.len(), response.next_cursor)?;
        let items = response
            .items
            .into_iter()
            .map(item_from_proto)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, next_cursor))
    }

    /// Fetch one page of community posts
    pub async fn fetch_posts(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> Result<Page<Post>, CatalogClientError> {
        let response = self
            .client
            .clone()
            .fetch_posts(self.request(cursor, page_size, selector))
            .await
            .map_err(|status| {
                error!("gRPC error while fetching posts: {}", status);
                CatalogClientError::RequestError(status)
            })?
            .into_inner();

        let next_cursor =
            check_page(cursor, page_size, response.posts.len(), response.next_cursor)?;
        let posts = response.posts.into_iter().map(post_from_proto).collect();

        Ok(Page::new(posts, next_cursor))
    }
}

/// A page may not exceed the requested size and its continuation cursor
/// must move past the one that was requested.
fn check_page(
    cursor: Option<Cursor>,
    page_size: NonZeroUsize,
    received: usize,
    next_cursor: Option<u64>,
) -> Result<Option<Cursor>, CatalogClientError> {
    if received > page_size.get() {
        error!(
            "Page larger than requested: expected at most {}, got {}",
            page_size, received
        );
        return Err(CatalogClientError::InvalidResponse(format!(
            "requested {} records, received {}",
            page_size, received
        )));
    }

    let requested = cursor.map_or(0, Cursor::offset);
    match next_cursor {
        Some(next) if next <= requested => Err(CatalogClientError::InvalidResponse(format!(
            "next cursor {} does not advance past {}",
            next, requested
        ))),
        next => Ok(next.map(Cursor)),
    }
}

#[async_trait]
impl PageFetcher<Item> for CatalogClient {
    fn name(&self) -> &str {
        "CatalogClient"
    }

    #[instrument(skip(self), fields(addr = %self.service_addr, kind = "item"))]
    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> sources::Result<Page<Item>> {
        let page = self
            .fetch_items(cursor, page_size, selector)
            .await
            .map_err(|e| e.into_fetch_error(cursor, selector))?;
        debug!(received = page.len(), more = page.has_more(), "Fetched item page");
        Ok(page)
    }
}

#[async_trait]
impl PageFetcher<Post> for CatalogClient {
    fn name(&self) -> &str {
        "CatalogClient"
    }

    #[instrument(skip(self), fields(addr = %self.service_addr, kind = "post"))]
    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
        selector: &Selector,
    ) -> sources::Result<Page<Post>> {
        let page = self
            .fetch_posts(cursor, page_size, selector)
            .await
            .map_err(|e| e.into_fetch_error(cursor, selector))?;
        debug!(received = page.len(), more = page.has_more(), "Fetched post page");
        Ok(page)
    }
}
