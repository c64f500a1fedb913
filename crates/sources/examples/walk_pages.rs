//! Example: walk a category page by page
//!
//! Run with: cargo run --package sources --example walk_pages
//!
//! This example shows how to:
//! 1. Load the fixture catalog
//! 2. Serve it through a `CatalogSource` with simulated latency
//! 3. Follow `next_cursor` until the stream ends

use catalog::{Catalog, Item};
use sources::{CatalogSource, Page, PageFetcher, Selector};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== Tribe Page Walk Example ===\n");

    let catalog = Arc::new(Catalog::load_from_dir(Path::new("data"))?);
    let source = CatalogSource::new(catalog).with_latency(Duration::from_millis(20));
    let selector = Selector::category("plants");
    let page_size = NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN);

    let mut cursor = None;
    let mut page_number = 1;
    loop {
        let start = Instant::now();
        let page: Page<Item> = source.fetch_page(cursor, page_size, &selector).await?;
        println!("Page {} ({:?}):", page_number, start.elapsed());
        for item in &page.items {
            println!("  #{:<3} {:<24} {:>7}", item.id, item.title, item.price());
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
        page_number += 1;
    }

    println!("\nEnd of stream for {}", selector);
    Ok(())
}
