//! Attribute membership filter.
//!
//! Keeps a record when its value for a constrained attribute is one of the
//! accepted values. This is the filter behind every category, size and
//! color chip in the list views.

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use catalog::Record;

/// Removes records whose attribute values are not accepted.
///
/// ## Algorithm
/// For each record, for each constrained attribute in scope:
/// 1. Read the record's values for the attribute
/// 2. Pass the attribute if any value is in the accepted set
/// 3. Keep the record only if every attribute passes
pub struct AttributeFilter {
    /// `None` checks every constrained attribute
    attribute: Option<String>,
}

impl AttributeFilter {
    /// Check every attribute the criteria constrain
    pub fn all() -> Self {
        Self { attribute: None }
    }

    /// Check a single attribute and ignore the others
    pub fn only(attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
        }
    }
}

impl<R: Record> Filter<R> for AttributeFilter {
    fn name(&self) -> &str {
        self.attribute.as_deref().unwrap_or("AttributeFilter")
    }

    fn apply(&self, records: Vec<R>, criteria: &FilterCriteria) -> Vec<R> {
        match &self.attribute {
            None => {
                if criteria.is_unconstrained() {
                    return records;
                }
                records
                    .into_iter()
                    .filter(|record| criteria.accepts(record))
                    .collect()
            }
            Some(name) => match criteria.accepted(name) {
                None => records,
                Some(values) => records
                    .into_iter()
                    .filter(|record| {
                        record
                            .attribute_values(name)
                            .into_iter()
                            .any(|value| values.contains(value))
                    })
                    .collect(),
            },
        }
    }
}
