//! Filter criteria chosen by the user.
//!
//! Criteria map an attribute name to the set of values the user accepts.
//! An attribute with an empty set places no constraint, which is how a
//! cleared filter chip is represented.

use catalog::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria {
    accepted: BTreeMap<String, BTreeSet<String>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `values` for `attribute` (builder pattern)
    pub fn with<I, S>(mut self, attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(attribute, values);
        self
    }

    /// Replace the accepted values for `attribute`
    pub fn set<I, S>(&mut self, attribute: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted
            .insert(attribute.into(), values.into_iter().map(Into::into).collect());
    }

    /// Remove the constraint on `attribute`
    pub fn clear(&mut self, attribute: &str) {
        self.accepted.remove(attribute);
    }

    pub fn accepted(&self, attribute: &str) -> Option<&BTreeSet<String>> {
        self.accepted.get(attribute).filter(|values| !values.is_empty())
    }

    /// Attributes that actually constrain records, with their accepted values
    pub fn constraints(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.accepted
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| (name.as_str(), values))
    }

    /// True when no attribute is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.constraints().next().is_none()
    }

    /// Whether `record` satisfies every constraint.
    ///
    /// Multi-valued attributes pass when any of their values is accepted.
    /// A record with no value for a constrained attribute fails it.
    pub fn accepts<R: Record>(&self, record: &R) -> bool {
        self.constraints().all(|(name, values)| {
            record
                .attribute_values(name)
                .into_iter()
                .any(|value| values.contains(value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Badge, Item};

    fn item(size: &str, color: Option<&str>, badge: Vec<Badge>) -> Item {
        Item {
            id: 1,
            title: "Pot".to_string(),
            category: "pots".to_string(),
            classification: "ceramic".to_string(),
            color: color.map(str::to_string),
            size: size.to_string(),
            origin: "KR".to_string(),
            original_price: 10_000,
            discount: 0,
            delivery_period: 1,
            badge,
            img_url: String::new(),
        }
    }

    #[test]
    fn test_empty_sets_are_unconstrained() {
        let criteria = FilterCriteria::new().with("size", Vec::<String>::new());
        assert!(criteria.is_unconstrained());
        assert!(criteria.accepted("size").is_none());
        assert!(criteria.accepts(&item("S", None, vec![])));
    }

    #[test]
    fn test_every_constraint_must_hold() {
        let criteria = FilterCriteria::new()
            .with("size", ["S", "M"])
            .with("color", ["white"]);

        assert!(criteria.accepts(&item("M", Some("white"), vec![])));
        assert!(!criteria.accepts(&item("L", Some("white"), vec![])));
        assert!(!criteria.accepts(&item("S", Some("black"), vec![])));
        // no color at all cannot satisfy a color constraint
        assert!(!criteria.accepts(&item("S", None, vec![])));
    }

    #[test]
    fn test_multi_valued_attribute_matches_any() {
        let criteria = FilterCriteria::new().with("badge", ["fast"]);
        assert!(criteria.accepts(&item("S", None, vec![Badge::Hot, Badge::Fast])));
        assert!(!criteria.accepts(&item("S", None, vec![Badge::Hot])));
    }

    #[test]
    fn test_clear_removes_constraint() {
        let mut criteria = FilterCriteria::new().with("size", ["XL"]);
        assert!(!criteria.accepts(&item("S", None, vec![])));
        criteria.clear("size");
        assert!(criteria.accepts(&item("S", None, vec![])));
    }

    #[test]
    fn test_json_shape() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"size": ["S"], "origin": []}"#).unwrap();
        assert_eq!(
            criteria,
            FilterCriteria::new()
                .with("size", ["S"])
                .with("origin", Vec::<String>::new())
        );
        assert_eq!(criteria.constraints().count(), 1);
    }
}
