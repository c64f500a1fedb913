//! In-memory catalog built from fixture files.
//!
//! Records keep their fixture order, which is the order the remote database
//! returns them in. A category index maps each category to record positions
//! so a page request for one tab does not scan the whole catalog.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::{Item, ItemId, Post, PostId, Record};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Main data structure holding every item and post plus lookup indices.
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<Item>,
    posts: Vec<Post>,

    /// Positions into `items`, grouped by category
    item_categories: HashMap<String, Vec<usize>>,
    /// Positions into `posts`, grouped by category
    post_categories: HashMap<String, Vec<usize>>,
}

/// Records that can be listed straight out of a [`Catalog`].
pub trait CatalogRecord: Record {
    /// Every stored record of this kind, in fixture order
    fn stored(catalog: &Catalog) -> &[Self];

    /// Positions of the records listed under `category`
    fn category_positions<'a>(catalog: &'a Catalog, category: &str) -> &'a [usize];
}

impl CatalogRecord for Item {
    fn stored(catalog: &Catalog) -> &[Self] {
        &catalog.items
    }

    fn category_positions<'a>(catalog: &'a Catalog, category: &str) -> &'a [usize] {
        catalog
            .item_categories
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl CatalogRecord for Post {
    fn stored(catalog: &Catalog) -> &[Self] {
        &catalog.posts
    }

    fn category_positions<'a>(catalog: &'a Catalog, category: &str) -> &'a [usize] {
        catalog
            .post_categories
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl Catalog {
    /// Creates a new, empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `items.json` and `posts.json` from a fixture directory.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Insert records in fixture order
    /// 3. Build the category indices
    /// 4. Validate ids and discounts
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        if !data_dir.is_dir() {
            return Err(CatalogError::FileNotFound {
                path: data_dir.display().to_string(),
            });
        }

        let items_path = data_dir.join("items.json");
        let posts_path = data_dir.join("posts.json");

        let (items, posts) = rayon::join(
            || parser::parse_items(&items_path),
            || parser::parse_posts(&posts_path),
        );
        let items = items?;
        let posts = posts?;

        info!(
            items = items.len(),
            posts = posts.len(),
            "Loaded catalog fixtures from {}",
            data_dir.display()
        );

        let mut catalog = Catalog::new();
        for item in items {
            catalog.insert_item(item);
        }
        for post in posts {
            catalog.insert_post(post);
        }
        catalog.build_category_index();
        catalog.validate()?;

        Ok(catalog)
    }

    /// Insert an item. Call [`Catalog::build_category_index`] afterwards.
    pub fn insert_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Insert a post. Call [`Catalog::build_category_index`] afterwards.
    pub fn insert_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    /// Rebuild the category indices from scratch
    pub fn build_category_index(&mut self) {
        self.item_categories = group_by_category(&self.items);
        self.post_categories = group_by_category(&self.posts);
    }

    /// Check that ids are unique per kind and discounts are percentages
    pub fn validate(&self) -> Result<()> {
        ensure_unique_ids(&self.items)?;
        ensure_unique_ids(&self.posts)?;

        if let Some(item) = self.items.par_iter().find_any(|item| item.discount > 100) {
            return Err(CatalogError::InvalidValue {
                field: format!("discount of item {}", item.id),
                value: item.discount.to_string(),
            });
        }
        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Sorted list of item categories, for building shop tabs
    pub fn item_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.item_categories.keys().map(String::as_str).collect();
        categories.sort_unstable();
        categories
    }

    /// Sorted list of post categories, for building community tabs
    pub fn post_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.post_categories.keys().map(String::as_str).collect();
        categories.sort_unstable();
        categories
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize) {
        (self.items.len(), self.posts.len())
    }
}

fn group_by_category<R: Record>(records: &[R]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        index
            .entry(record.category().to_string())
            .or_default()
            .push(position);
    }
    index
}

fn ensure_unique_ids<R: Record>(records: &[R]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(CatalogError::DuplicateId {
                entity: R::KIND.to_string(),
                id: record.id(),
            });
        }
    }
    Ok(())
}
