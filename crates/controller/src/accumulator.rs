//! Accumulated collection of fetched pages.
//!
//! Pages are appended in fetch order, records keep their order within a
//! page, and nothing is deduplicated. The collection belongs to exactly one
//! selector generation; pages stamped with any other generation are
//! ignored.

use crate::generation::Generation;
use sources::Page;
use std::sync::Arc;
use tracing::debug;

/// Result of offering a page to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended { added: usize, total: usize },
    /// The page belongs to an abandoned generation and was dropped
    Stale,
}

#[derive(Debug, Clone)]
pub struct Accumulator<R> {
    generation: Generation,
    /// Shared with in-flight recomputes; appends copy on write
    records: Arc<Vec<R>>,
    pages: usize,
}

impl<R: Clone> Accumulator<R> {
    pub fn new() -> Self {
        Self {
            generation: Generation::INITIAL,
            records: Arc::new(Vec::new()),
            pages: 0,
        }
    }

    /// Clear to empty and adopt `generation`
    pub fn reset(&mut self, generation: Generation) {
        self.generation = generation;
        self.records = Arc::new(Vec::new());
        self.pages = 0;
    }

    /// Append `page` to the tail if it belongs to the current generation
    pub fn append(&mut self, generation: Generation, page: Page<R>) -> AppendOutcome {
        if generation != self.generation {
            debug!(
                page_generation = %generation,
                current = %self.generation,
                "Dropping page from abandoned generation"
            );
            return AppendOutcome::Stale;
        }

        let added = page.items.len();
        Arc::make_mut(&mut self.records).extend(page.items);
        self.pages += 1;
        AppendOutcome::Appended {
            added,
            total: self.records.len(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Cheap handle to the current records
    pub fn shared(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.records)
    }

    /// Pages appended since the last reset
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Clone> Default for Accumulator<R> {
    fn default() -> Self {
        Self::new()
    }
}
