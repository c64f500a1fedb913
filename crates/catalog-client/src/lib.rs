//! Catalog client for the remote catalog gRPC service.
//!
//! This crate lets a list controller page through a catalog served over
//! gRPC. It handles:
//! - Connection management to the catalog service
//! - Converting records to and from protobuf messages
//! - Checking page sizes and cursors in every response
//! - A fixture-backed service for local development and tests

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("catalog");
}

pub mod client;
pub mod convert;
pub mod error;
pub mod service;

pub use client::CatalogClient;
pub use error::CatalogClientError;
pub use service::{serve, FixtureCatalogService};
