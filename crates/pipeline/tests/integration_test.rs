//! Integration tests for the pipeline.
//!
//! These tests run the filter and sort stages over the bundled fixture
//! catalog, the way a list view derives what it renders.

use catalog::{Catalog, Item, Post, Record};
use pipeline::{apply_filters, apply_sort, derive_view, FilterCriteria, FilterPipeline, SortMode};
use std::path::PathBuf;

fn load_catalog() -> Catalog {
    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
    Catalog::load_from_dir(&data_dir).unwrap()
}

fn ids<R: Record>(records: &[R]) -> Vec<u64> {
    records.iter().map(Record::id).collect()
}

/// True when `sub` appears in `full` in the same relative order
fn is_subsequence(sub: &[u64], full: &[u64]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|id| rest.any(|candidate| candidate == id))
}

#[test]
fn test_filter_keeps_only_accepted_records_in_order() {
    let catalog = load_catalog();
    let items: Vec<Item> = catalog.items().to_vec();
    let criteria = FilterCriteria::new()
        .with("size", ["S", "M"])
        .with("color", ["white", "black"]);

    let filtered = apply_filters(items.clone(), &criteria);

    assert!(!filtered.is_empty());
    for item in &filtered {
        assert!(item.size == "S" || item.size == "M");
        assert!(matches!(item.color.as_deref(), Some("white") | Some("black")));
    }
    // every accepted record survives
    let accepted = items.iter().filter(|item| criteria.accepts(*item)).count();
    assert_eq!(filtered.len(), accepted);
    assert!(is_subsequence(&ids(&filtered), &ids(&items)));

    let again = apply_filters(filtered.clone(), &criteria);
    assert_eq!(again, filtered);
}

#[test]
fn test_empty_criteria_is_identity() {
    let catalog = load_catalog();
    let items = catalog.items().to_vec();

    let filtered = apply_filters(items.clone(), &FilterCriteria::new());
    assert_eq!(filtered, items);
}

#[test]
fn test_small_pots_by_lowest_price() {
    let catalog = load_catalog();
    let criteria = FilterCriteria::new()
        .with("category", ["pots"])
        .with("size", ["S"]);

    let view = derive_view(catalog.items(), &criteria, SortMode::LowestPrice);

    // Concrete Planter 6900 at 30% off = 4830, Hanging Basket 45000 at 0%
    assert_eq!(ids(&view), vec![21, 18]);
    assert_eq!(view[0].price(), 4_830);
}

#[test]
fn test_sorted_view_is_a_permutation_of_the_filtered_list() {
    let catalog = load_catalog();
    let criteria = FilterCriteria::new().with("badge", ["hot", "fast"]);
    let filtered = apply_filters(catalog.items().to_vec(), &criteria);

    for mode in SortMode::ALL {
        let sorted = apply_sort(filtered.clone(), mode);
        let mut expected = ids(&filtered);
        let mut actual = ids(&sorted);
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "{} changed the record set", mode);
    }
}

#[test]
fn test_highest_discount_rate_is_non_increasing() {
    let catalog = load_catalog();
    let view = derive_view(catalog.items(), &FilterCriteria::new(), SortMode::HighestDiscountRate);

    for pair in view.windows(2) {
        assert!(pair[0].discount >= pair[1].discount);
        if pair[0].discount == pair[1].discount {
            // ties keep catalog order
            assert!(pair[0].id < pair[1].id);
        }
    }
}

#[test]
fn test_popular_posts_in_a_tab() {
    let catalog = load_catalog();
    let criteria = FilterCriteria::new().with("category", ["정보"]);

    let view = FilterPipeline::<Post>::standard().derive_view(
        catalog.posts(),
        &criteria,
        SortMode::Popular,
    );

    // posts 4 and 16 have four likes, 15 has three
    assert_eq!(ids(&view), vec![4, 16, 15]);
}
