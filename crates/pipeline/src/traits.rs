//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to an accumulated record list.

use crate::criteria::FilterCriteria;
use catalog::Record;

/// Core trait for filtering records.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows a pipeline to be shared with a background recompute
/// - Filters take ownership of the Vec and return the kept records
/// - Filters must keep the relative order of the records they keep
/// - Filtering cannot fail: a record either passes or it does not
pub trait Filter<R: Record>: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a list of records.
    ///
    /// # Arguments
    /// * `records` - The records to filter (takes ownership)
    /// * `criteria` - The user's current filter selections
    fn apply(&self, records: Vec<R>, criteria: &FilterCriteria) -> Vec<R>;
}
