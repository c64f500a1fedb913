//! Filter and sort stages for paginated record lists.
//!
//! This crate provides:
//! - FilterCriteria, the user's attribute selections
//! - Filter trait and the attribute filter
//! - FilterPipeline for composing filters
//! - The sort stage and its sort modes
//! - Search keyword extraction and ranking
//!
//! ## Architecture
//! A list view derives what it renders from the accumulated records:
//! 1. Filters drop records whose attributes are not accepted
//! 2. The sort stage reorders what is left by the selected mode
//!
//! Both stages are pure; the derived view is recomputed in full whenever
//! the records, the criteria or the sort mode change.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterCriteria, FilterPipeline, SortMode};
//!
//! let criteria = FilterCriteria::new().with("size", ["S", "M"]);
//! let view =
//!     FilterPipeline::standard().derive_view(&accumulated, &criteria, SortMode::LowestPrice);
//! ```

pub mod criteria;
pub mod filter_pipeline;
pub mod filters;
pub mod keywords;
pub mod sort;
pub mod traits;

// Re-export main types
pub use criteria::FilterCriteria;
pub use filter_pipeline::{apply_filters, derive_view, FilterPipeline};
pub use keywords::{extract_keywords, rank_keywords, KeywordCount, KeywordTally};
pub use sort::{apply_sort, SortMode, UnknownSortMode};
pub use traits::Filter;
