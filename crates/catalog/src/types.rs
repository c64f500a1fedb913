//! Core record types for the storefront catalog and community feed.
//!
//! Shop items and community posts are both served page by page and run
//! through the same filter/sort pipeline, so they share the [`Record`]
//! trait. Field names on the wire follow the remote database columns
//! (`originalprice`, `deliveryperiod`, `imgurl`).

use crate::price;
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a shop item
pub type ItemId = u64;

/// Unique identifier for a community post
pub type PostId = u64;

/// Account identifier as issued by the auth provider
pub type UserId = String;

// =============================================================================
// Record trait
// =============================================================================

/// Read-only view of a listable record.
///
/// The pipeline never mutates records; it only reads ids, attribute values
/// and sort metrics through this trait.
pub trait Record: Clone + Send + Sync + 'static {
    /// Short name used in log lines ("item", "post")
    const KIND: &'static str;

    /// Unique identifier within a session
    fn id(&self) -> u64;

    /// Category the record is listed under (shop tab / community tab)
    fn category(&self) -> &str;

    /// All values of a named attribute.
    ///
    /// Single-valued attributes return at most one value; unknown attributes
    /// return an empty vec.
    fn attribute_values(&self, name: &str) -> Vec<&str>;

    /// Whether the record's searchable text contains `keyword`, ignoring case
    fn matches_keyword(&self, keyword: &str) -> bool;

    /// Price after discount, for records that have one
    fn effective_price(&self) -> Option<u32> {
        None
    }

    /// Discount percentage, for records that have one
    fn discount_rate(&self) -> Option<u8> {
        None
    }

    /// Engagement metric (likes), for records that have one
    fn engagement(&self) -> Option<u32> {
        None
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// =============================================================================
// Shop items
// =============================================================================

/// Promotional badge shown on an item card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Hot,
    Fast,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::Hot => "hot",
            Badge::Fast => "fast",
        }
    }
}

/// A product listed in the shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub classification: String,
    #[serde(default)]
    pub color: Option<String>,
    pub size: String,
    pub origin: String,
    #[serde(rename = "originalprice")]
    pub original_price: u32,
    /// Discount percentage, 0-100
    pub discount: u8,
    /// Days between order and delivery
    #[serde(rename = "deliveryperiod")]
    pub delivery_period: u32,
    #[serde(default)]
    pub badge: Vec<Badge>,
    #[serde(rename = "imgurl", default)]
    pub img_url: String,
}

impl Item {
    /// Price after discount
    pub fn price(&self) -> u32 {
        price::effective_price(self.original_price, self.discount)
    }
}

impl Record for Item {
    const KIND: &'static str = "item";

    fn id(&self) -> u64 {
        self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn attribute_values(&self, name: &str) -> Vec<&str> {
        match name {
            "category" => vec![self.category.as_str()],
            "classification" => vec![self.classification.as_str()],
            "color" => self.color.as_deref().into_iter().collect(),
            "size" => vec![self.size.as_str()],
            "origin" => vec![self.origin.as_str()],
            "badge" => self.badge.iter().map(Badge::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn matches_keyword(&self, keyword: &str) -> bool {
        contains_ignore_case(&self.title, keyword)
    }

    fn effective_price(&self) -> Option<u32> {
        Some(self.price())
    }

    fn discount_rate(&self) -> Option<u8> {
        Some(self.discount)
    }
}

// =============================================================================
// Community posts
// =============================================================================

/// A post in the community feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: String,
    pub author: UserId,
    /// Unix timestamp (seconds) of publication
    pub created_at: i64,
    /// Users who liked the post
    #[serde(default)]
    pub liked: Vec<UserId>,
}

impl Post {
    pub fn like_count(&self) -> u32 {
        u32::try_from(self.liked.len()).unwrap_or(u32::MAX)
    }
}

impl Record for Post {
    const KIND: &'static str = "post";

    fn id(&self) -> u64 {
        self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn attribute_values(&self, name: &str) -> Vec<&str> {
        match name {
            "category" => vec![self.category.as_str()],
            "author" => vec![self.author.as_str()],
            _ => Vec::new(),
        }
    }

    fn matches_keyword(&self, keyword: &str) -> bool {
        contains_ignore_case(&self.title, keyword) || contains_ignore_case(&self.content, keyword)
    }

    fn engagement(&self) -> Option<u32> {
        Some(self.like_count())
    }
}
