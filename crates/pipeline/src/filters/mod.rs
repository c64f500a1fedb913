//! Filter implementations for the record pipeline.
//!
//! This module contains the concrete filters that can be composed into a
//! FilterPipeline.

pub mod attribute;

// Re-export for convenience
pub use attribute::AttributeFilter;
