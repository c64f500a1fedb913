//! Conversions between catalog records and their protobuf messages.
//!
//! Incoming records are validated here: anything the catalog itself would
//! reject on load (unknown badges, discounts over 100%) is an invalid
//! response.

use crate::error::CatalogClientError;
use crate::proto::{ItemRecord, PageRequest, PostRecord};
use catalog::{Badge, Item, Post};
use sources::{Cursor, Selector};
use std::num::NonZeroUsize;

pub fn item_to_proto(item: &Item) -> ItemRecord {
    ItemRecord {
        id: item.id,
        title: item.title.clone(),
        category: item.category.clone(),
        classification: item.classification.clone(),
        color: item.color.clone(),
        size: item.size.clone(),
        origin: item.origin.clone(),
        original_price: item.original_price,
        discount: u32::from(item.discount),
        delivery_period: item.delivery_period,
        badge: item.badge.iter().map(|b| b.as_str().to_string()).collect(),
        img_url: item.img_url.clone(),
    }
}

pub fn item_from_proto(record: ItemRecord) -> Result<Item, CatalogClientError> {
    let discount = u8::try_from(record.discount)
        .ok()
        .filter(|d| *d <= 100)
        .ok_or_else(|| {
            CatalogClientError::InvalidResponse(format!(
                "item {} has discount {}%",
                record.id, record.discount
            ))
        })?;

    let badge = record
        .badge
        .iter()
        .map(|name| parse_badge(name, record.id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Item {
        id: record.id,
        title: record.title,
        category: record.category,
        classification: record.classification,
        color: record.color,
        size: record.size,
        origin: record.origin,
        original_price: record.original_price,
        discount,
        delivery_period: record.delivery_period,
        badge,
        img_url: record.img_url,
    })
}

fn parse_badge(name: &str, item_id: u64) -> Result<Badge, CatalogClientError> {
    match name {
        "hot" => Ok(Badge::Hot),
        "fast" => Ok(Badge::Fast),
        other => Err(CatalogClientError::InvalidResponse(format!(
            "item {} has unknown badge {:?}",
            item_id, other
        ))),
    }
}

pub fn post_to_proto(post: &Post) -> PostRecord {
    PostRecord {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        category: post.category.clone(),
        author: post.author.clone(),
        created_at: post.created_at,
        liked: post.liked.clone(),
    }
}

pub fn post_from_proto(record: PostRecord) -> Post {
    Post {
        id: record.id,
        title: record.title,
        content: record.content,
        category: record.category,
        author: record.author,
        created_at: record.created_at,
        liked: record.liked,
    }
}

pub fn request_to_proto(
    cursor: Option<Cursor>,
    page_size: NonZeroUsize,
    selector: &Selector,
) -> PageRequest {
    PageRequest {
        cursor: cursor.map(Cursor::offset),
        page_size: u32::try_from(page_size.get()).unwrap_or(u32::MAX),
        category: selector.category.clone(),
        keyword: selector.keyword.clone(),
    }
}

/// Decode a request on the service side; `None` when the page size is zero
pub fn request_from_proto(
    request: PageRequest,
) -> Option<(Option<Cursor>, NonZeroUsize, Selector)> {
    let page_size = NonZeroUsize::new(usize::try_from(request.page_size).ok()?)?;
    let selector = Selector {
        category: request.category,
        keyword: request.keyword,
    };
    Some((request.cursor.map(Cursor), page_size, selector))
}
