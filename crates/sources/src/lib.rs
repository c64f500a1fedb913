//! # Sources Crate
//!
//! Page sources for item and post lists.
//!
//! ## Components
//!
//! - **types**: `Cursor`, `Selector` and `Page`
//! - **traits**: the async `PageFetcher` trait every source implements
//! - **catalog_source**: pages served out of the in-memory `Catalog`
//! - **cache**: `CachedFetcher`, a first-page cache with a staleness policy
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CatalogSource, PageFetcher, Selector};
//! use catalog::{Catalog, Item};
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::load_from_dir(Path::new("data"))?);
//! let source = CatalogSource::new(catalog);
//!
//! let page_size = NonZeroUsize::new(10).unwrap();
//! let plants = Selector::category("plants");
//! let first: Page<Item> = source.fetch_page(None, page_size, &plants).await?;
//! if let Some(cursor) = first.next_cursor {
//!     let second: Page<Item> = source.fetch_page(Some(cursor), page_size, &plants).await?;
//! }
//! ```

pub mod cache;
pub mod catalog_source;
pub mod error;
pub mod traits;
pub mod types;

pub use cache::{CachedFetcher, Staleness};
pub use catalog_source::CatalogSource;
pub use error::{FetchError, Result};
pub use traits::PageFetcher;
pub use types::{Cursor, Page, Selector};
