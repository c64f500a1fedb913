//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the FilterPipeline struct that chains filters
//! together using the builder pattern, and the derive pass that turns an
//! accumulated record list into the view a list renders.

use crate::criteria::FilterCriteria;
use crate::filters::AttributeFilter;
use crate::sort::{apply_sort, SortMode};
use crate::traits::Filter;
use catalog::Record;
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AttributeFilter::only("category"))
///     .add_filter(AttributeFilter::only("size"));
///
/// let filtered = pipeline.apply(records, &criteria);
/// ```
pub struct FilterPipeline<R: Record> {
    filters: Vec<Box<dyn Filter<R>>>,
}

impl<R: Record> FilterPipeline<R> {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The pipeline list views use: one attribute filter over every
    /// constrained attribute.
    pub fn standard() -> Self {
        Self::new().add_filter(AttributeFilter::all())
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter<R> + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the records.
    ///
    /// ## Algorithm
    /// 1. Start with the input records
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered list
    pub fn apply(&self, records: Vec<R>, criteria: &FilterCriteria) -> Vec<R> {
        let mut current = records;
        for filter in &self.filters {
            debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, criteria);
            debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }

    /// Filter then sort a copy of `records`.
    ///
    /// The accumulated list is left untouched; the result is always a full
    /// recompute from it.
    pub fn derive_view(
        &self,
        records: &[R],
        criteria: &FilterCriteria,
        mode: SortMode,
    ) -> Vec<R> {
        let filtered = self.apply(records.to_vec(), criteria);
        apply_sort(filtered, mode)
    }
}

impl<R: Record> Default for FilterPipeline<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the records that satisfy every constraint in `criteria`, in order
pub fn apply_filters<R: Record>(records: Vec<R>, criteria: &FilterCriteria) -> Vec<R> {
    AttributeFilter::all().apply(records, criteria)
}

/// Filter then sort with the standard pipeline
pub fn derive_view<R: Record>(records: &[R], criteria: &FilterCriteria, mode: SortMode) -> Vec<R> {
    FilterPipeline::standard().derive_view(records, criteria, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Badge, Item};

    fn item(id: u64, size: &str, price: u32) -> Item {
        Item {
            id,
            title: format!("Item {}", id),
            category: "pots".to_string(),
            classification: "ceramic".to_string(),
            color: None,
            size: size.to_string(),
            origin: "KR".to_string(),
            original_price: price,
            discount: 0,
            delivery_period: 1,
            badge: vec![Badge::Fast],
            img_url: String::new(),
        }
    }

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline: FilterPipeline<Item> = FilterPipeline::new();
        let criteria = FilterCriteria::new().with("size", ["S"]);

        let filtered = pipeline.apply(vec![item(1, "S", 100), item(2, "M", 100)], &criteria);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_chained_filters() {
        let pipeline = FilterPipeline::new()
            .add_filter(AttributeFilter::only("size"))
            .add_filter(AttributeFilter::only("badge"));
        let criteria = FilterCriteria::new()
            .with("size", ["S"])
            .with("badge", ["fast"]);

        let filtered = pipeline.apply(
            vec![item(1, "S", 100), item(2, "M", 100), item(3, "S", 100)],
            &criteria,
        );
        assert_eq!(ids(&filtered), vec![1, 3]);
    }

    #[test]
    fn test_derive_view_leaves_input_untouched() {
        let records = vec![item(3, "S", 300), item(1, "M", 100), item(2, "S", 200)];
        let criteria = FilterCriteria::new().with("size", ["S"]);

        let view =
            FilterPipeline::standard().derive_view(&records, &criteria, SortMode::LowestPrice);

        assert_eq!(ids(&view), vec![2, 3]);
        assert_eq!(ids(&records), vec![3, 1, 2]);
        assert_eq!(derive_view(&records, &criteria, SortMode::LowestPrice), view);
    }
}
