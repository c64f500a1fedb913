//! Sort stage: reorders a filtered list by the selected sort mode.
//!
//! ## Algorithm
//! 1. Compute one integer key per record in parallel (Rayon)
//! 2. Stable-sort the (key, record) pairs by key
//! 3. Strip the keys
//!
//! Descending modes negate their metric so every mode sorts ascending.
//! Records without the metric (posts under a price mode) get the largest
//! key and land after every record that has one, in their original order.

use catalog::Record;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The sort orders a list view offers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// 추천순: catalog order (ascending id)
    #[default]
    Recommended,
    /// 낮은가격순: ascending effective price
    LowestPrice,
    /// 높은가격순: descending effective price
    HighestPrice,
    /// 할인률순: descending discount percentage
    HighestDiscountRate,
    /// 인기순: descending like count
    Popular,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Recommended,
        SortMode::LowestPrice,
        SortMode::HighestPrice,
        SortMode::HighestDiscountRate,
        SortMode::Popular,
    ];

    /// Label shown in the sort menu
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Recommended => "추천순",
            SortMode::LowestPrice => "낮은가격순",
            SortMode::HighestPrice => "높은가격순",
            SortMode::HighestDiscountRate => "할인률순",
            SortMode::Popular => "인기순",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == label)
    }

    fn key<R: Record>(&self, record: &R) -> i128 {
        let metric = match self {
            SortMode::Recommended => Some(i128::from(record.id())),
            SortMode::LowestPrice => record.effective_price().map(i128::from),
            SortMode::HighestPrice => record.effective_price().map(|p| -i128::from(p)),
            SortMode::HighestDiscountRate => record.discount_rate().map(|d| -i128::from(d)),
            SortMode::Popular => record.engagement().map(|e| -i128::from(e)),
        };
        metric.unwrap_or(i128::MAX)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown sort mode: {0}")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    /// Accepts the menu label or the snake_case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mode) = Self::from_label(s) {
            return Ok(mode);
        }
        match s {
            "recommended" => Ok(SortMode::Recommended),
            "lowest_price" => Ok(SortMode::LowestPrice),
            "highest_price" => Ok(SortMode::HighestPrice),
            "highest_discount_rate" => Ok(SortMode::HighestDiscountRate),
            "popular" => Ok(SortMode::Popular),
            _ => Err(UnknownSortMode(s.to_string())),
        }
    }
}

/// Reorder `records` by `mode`. Stable: equal keys keep their input order.
pub fn apply_sort<R: Record>(records: Vec<R>, mode: SortMode) -> Vec<R> {
    let keys: Vec<i128> = records.par_iter().map(|record| mode.key(record)).collect();

    let mut keyed: Vec<(i128, R)> = keys.into_iter().zip(records).collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Item, Post};

    fn item(id: u64, original_price: u32, discount: u8) -> Item {
        Item {
            id,
            title: format!("Item {}", id),
            category: "tools".to_string(),
            classification: "hand".to_string(),
            color: None,
            size: "M".to_string(),
            origin: "KR".to_string(),
            original_price,
            discount,
            delivery_period: 1,
            badge: Vec::new(),
            img_url: String::new(),
        }
    }

    fn post(id: u64, likes: usize) -> Post {
        Post {
            id,
            title: format!("post {}", id),
            content: String::new(),
            category: "잡담".to_string(),
            author: "u".to_string(),
            created_at: 0,
            liked: (0..likes).map(|n| format!("user{}", n)).collect(),
        }
    }

    fn ids<R: Record>(records: &[R]) -> Vec<u64> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn test_lowest_price_keeps_ties_in_order() {
        // effective prices 500, 300, 300, 100
        let items = vec![item(1, 500, 0), item(2, 600, 50), item(3, 300, 0), item(4, 200, 50)];

        let sorted = apply_sort(items, SortMode::LowestPrice);

        assert_eq!(ids(&sorted), vec![4, 2, 3, 1]);
        let prices: Vec<u32> = sorted.iter().map(Item::price).collect();
        assert_eq!(prices, vec![100, 300, 300, 500]);
    }

    #[test]
    fn test_highest_price_and_discount() {
        // effective prices 900, 1500, 2000; discounts 10, 50, 0
        let items = vec![item(1, 1000, 10), item(2, 3000, 50), item(3, 2000, 0)];

        let by_price = apply_sort(items.clone(), SortMode::HighestPrice);
        assert_eq!(ids(&by_price), vec![3, 2, 1]);

        let by_discount = apply_sort(items, SortMode::HighestDiscountRate);
        assert_eq!(ids(&by_discount), vec![2, 1, 3]);
    }

    #[test]
    fn test_recommended_is_ascending_id() {
        let items = vec![item(9, 1, 0), item(2, 1, 0), item(5, 1, 0)];
        assert_eq!(ids(&apply_sort(items, SortMode::Recommended)), vec![2, 5, 9]);
    }

    #[test]
    fn test_popular_sorts_by_likes() {
        let posts = vec![post(1, 0), post(2, 3), post(3, 1), post(4, 3)];
        assert_eq!(ids(&apply_sort(posts, SortMode::Popular)), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_missing_metric_sorts_last_in_order() {
        let posts = vec![post(3, 0), post(1, 5), post(2, 1)];
        assert_eq!(ids(&apply_sort(posts, SortMode::LowestPrice)), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let items = vec![item(1, 300, 0), item(2, 100, 0), item(3, 300, 0), item(4, 200, 0)];
        for mode in SortMode::ALL {
            let once = apply_sort(items.clone(), mode);
            let twice = apply_sort(once.clone(), mode);
            assert_eq!(once, twice, "{} is not idempotent", mode);
        }
    }

    #[test]
    fn test_labels_round_trip() {
        for mode in SortMode::ALL {
            assert_eq!(mode.label().parse::<SortMode>(), Ok(mode));
        }
        assert_eq!("lowest_price".parse::<SortMode>(), Ok(SortMode::LowestPrice));
        assert_eq!(
            "cheapest".parse::<SortMode>(),
            Err(UnknownSortMode("cheapest".to_string()))
        );
    }
}
