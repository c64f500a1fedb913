//! Catalog service backed by the in-memory fixture catalog.
//!
//! Lets the CLI and the integration tests stand up a real gRPC endpoint
//! without the remote database.

use crate::convert::{item_to_proto, post_to_proto, request_from_proto};
use crate::proto::catalog_service_server::{CatalogService, CatalogServiceServer};
use crate::proto::{ItemPage, PageRequest, PostPage};
use anyhow::{Context, Result};
use catalog::{Item, Post};
use sources::{CatalogSource, Cursor, FetchError, PageFetcher, Selector};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct FixtureCatalogService {
    source: CatalogSource,
}

impl FixtureCatalogService {
    pub fn new(source: CatalogSource) -> Self {
        Self { source }
    }

    pub fn into_server(self) -> CatalogServiceServer<Self> {
        CatalogServiceServer::new(self)
    }
}

fn decode(
    request: Request<PageRequest>,
) -> Result<(Option<Cursor>, NonZeroUsize, Selector), Status> {
    request_from_proto(request.into_inner())
        .ok_or_else(|| Status::invalid_argument("page_size must be positive"))
}

fn to_status(err: FetchError) -> Status {
    match err {
        FetchError::InvalidCursor { .. } => Status::out_of_range(err.to_string()),
        FetchError::Unavailable(message) => Status::unavailable(message),
        FetchError::InvalidResponse(message) => Status::internal(message),
    }
}

#[tonic::async_trait]
impl CatalogService for FixtureCatalogService {
    async fn fetch_items(
        &self,
        request: Request<PageRequest>,
    ) -> Result<Response<ItemPage>, Status> {
        let (cursor, page_size, selector) = decode(request)?;
        debug!(?cursor, %page_size, %selector, "FetchItems");

        let page = PageFetcher::<Item>::fetch_page(&self.source, cursor, page_size, &selector)
            .await
            .map_err(to_status)?;

        Ok(Response::new(ItemPage {
            items: page.items.iter().map(item_to_proto).collect(),
            next_cursor: page.next_cursor.map(Cursor::offset),
        }))
    }

    async fn fetch_posts(
        &self,
        request: Request<PageRequest>,
    ) -> Result<Response<PostPage>, Status> {
        let (cursor, page_size, selector) = decode(request)?;
        debug!(?cursor, %page_size, %selector, "FetchPosts");

        let page = PageFetcher::<Post>::fetch_page(&self.source, cursor, page_size, &selector)
            .await
            .map_err(to_status)?;

        Ok(Response::new(PostPage {
            posts: page.items.iter().map(post_to_proto).collect(),
            next_cursor: page.next_cursor.map(Cursor::offset),
        }))
    }
}

/// Serve the fixture catalog on `addr` until the process is stopped
pub async fn serve(source: CatalogSource, addr: SocketAddr) -> Result<()> {
    info!("Catalog service listening on {}", addr);

    Server::builder()
        .add_service(FixtureCatalogService::new(source).into_server())
        .serve(addr)
        .await
        .context("Running catalog service")
}
