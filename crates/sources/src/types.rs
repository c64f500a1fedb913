//! Paging types shared by every page source.
//!
//! A list is fetched one [`Page`] at a time. The first request carries no
//! cursor; every later request carries the `next_cursor` of the page before
//! it. A page with no `next_cursor` ends the stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque page boundary handed back by a source.
///
/// Sources in this workspace use record offsets, but callers must treat the
/// value as a token and only ever echo it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cursor(pub u64);

impl Cursor {
    pub fn offset(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which slice of the catalog a list shows.
///
/// Changing either field starts a new list: the accumulated records are
/// dropped and paging restarts from the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Shop tab / community tab. `None` is the "all" tab.
    pub category: Option<String>,
    /// Search keyword matched against record text
    pub keyword: Option<String>,
}

impl Selector {
    /// The "all" tab with no search
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: non_blank(category.into()),
            keyword: None,
        }
    }

    /// Add a search keyword. Blank keywords are treated as no keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = non_blank(keyword.into());
        self
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category={}", self.category.as_deref().unwrap_or("*"))?;
        if let Some(keyword) = &self.keyword {
            write!(f, " keyword={:?}", keyword)?;
        }
        Ok(())
    }
}

/// One page of records, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Cursor for the following page; `None` ends the stream
    pub next_cursor: Option<Cursor>,
}

impl<R> Page<R> {
    pub fn new(items: Vec<R>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// A terminal page with no records
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_selector_fields_collapse_to_none() {
        let selector = Selector::category("  ").with_keyword("");
        assert_eq!(selector, Selector::all());

        let selector = Selector::category("plants").with_keyword(" fern ");
        assert_eq!(selector.category.as_deref(), Some("plants"));
        assert_eq!(selector.keyword.as_deref(), Some("fern"));
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::all().to_string(), "category=*");
        assert_eq!(
            Selector::category("tools").with_keyword("saw").to_string(),
            "category=tools keyword=\"saw\""
        );
    }

    #[test]
    fn test_page_has_more() {
        let page = Page::new(vec![1, 2], Some(Cursor(10)));
        assert!(page.has_more());
        assert_eq!(page.len(), 2);

        let last: Page<u32> = Page::empty();
        assert!(!last.has_more());
        assert!(last.is_empty());
    }
}
