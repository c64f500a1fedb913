//! Loads the bundled fixture catalog under `data/`.

use catalog::{Catalog, CatalogRecord, Item, Post, Record};
use std::path::PathBuf;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn test_load_bundled_fixtures() {
    let catalog = Catalog::load_from_dir(&fixture_dir()).unwrap();
    let (items, posts) = catalog.counts();

    assert_eq!(items, 22);
    assert_eq!(posts, 16);
    assert_eq!(catalog.item_categories(), vec!["plants", "pots", "tools"]);
}

#[test]
fn test_category_positions_point_at_matching_records() {
    let catalog = Catalog::load_from_dir(&fixture_dir()).unwrap();

    for category in catalog.item_categories() {
        for &position in Item::category_positions(&catalog, category) {
            assert_eq!(Item::stored(&catalog)[position].category(), category);
        }
    }
    for category in catalog.post_categories() {
        for &position in Post::category_positions(&catalog, category) {
            assert_eq!(Post::stored(&catalog)[position].category(), category);
        }
    }
}

#[test]
fn test_lookup_by_id() {
    let catalog = Catalog::load_from_dir(&fixture_dir()).unwrap();

    assert_eq!(catalog.get_item(1).map(|i| i.title.as_str()), Some("Monstera"));
    assert!(catalog.get_post(16).is_some());
    assert!(catalog.get_post(99).is_none());
}
