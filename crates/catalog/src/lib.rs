//! # Catalog Crate
//!
//! Records served by the storefront: shop items and community posts.
//!
//! ## Main Components
//!
//! - **types**: `Item`, `Post` and the `Record` trait the list pipeline reads through
//! - **price**: effective price after discount
//! - **parser**: JSON fixture parsing
//! - **index**: the in-memory `Catalog` with category lookups
//! - **error**: error types for fixture loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_dir(Path::new("data"))?;
//! let (items, posts) = catalog.counts();
//! println!("{} items, {} posts", items, posts);
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod price;
pub mod types;

pub use error::{CatalogError, Result};
pub use index::{Catalog, CatalogRecord};
pub use price::effective_price;
pub use types::{Badge, Item, ItemId, Post, PostId, Record, UserId};
