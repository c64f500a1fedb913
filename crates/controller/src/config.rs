//! List configuration.
//!
//! Values come from built-in defaults, an optional JSON file, and
//! `TRIBE_*` environment variables, applied in that order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sources::Staleness;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

const fn page_size(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    }
}

/// Shop item lists fetch ten records per page
pub const ITEM_PAGE_SIZE: NonZeroUsize = page_size(10);
/// Community post lists fetch eight records per page
pub const POST_PAGE_SIZE: NonZeroUsize = page_size(8);

pub const ENV_PAGE_SIZE: &str = "TRIBE_PAGE_SIZE";
pub const ENV_DEBOUNCE_MS: &str = "TRIBE_DEBOUNCE_MS";
pub const ENV_FIRST_PAGE_STALE_SECS: &str = "TRIBE_FIRST_PAGE_STALE_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: NonZeroUsize,
    /// How long a sentinel visibility report must hold before it counts
    #[serde(default = "default_debounce_ms")]
    pub visibility_debounce_ms: u64,
    /// Reuse policy for cached first pages
    #[serde(default)]
    pub first_page_staleness: Staleness,
}

fn default_page_size() -> NonZeroUsize {
    ITEM_PAGE_SIZE
}
fn default_debounce_ms() -> u64 {
    50
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::items()
    }
}

impl ListConfig {
    /// Defaults for shop item lists
    pub fn items() -> Self {
        Self {
            page_size: ITEM_PAGE_SIZE,
            visibility_debounce_ms: default_debounce_ms(),
            first_page_staleness: Staleness::default(),
        }
    }

    /// Defaults for community post lists
    pub fn posts() -> Self {
        Self {
            page_size: POST_PAGE_SIZE,
            ..Self::items()
        }
    }

    /// Item defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read list config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse list config {}", path.display()))
    }

    /// Apply `TRIBE_*` variables on top of `self`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            match raw.trim().parse::<NonZeroUsize>() {
                Ok(size) => self.page_size = size,
                Err(_) => warn!(
                    "Ignoring {}={:?}: expected a positive integer",
                    ENV_PAGE_SIZE, raw
                ),
            }
        }
        if let Some(raw) = lookup(ENV_DEBOUNCE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.visibility_debounce_ms = ms,
                Err(_) => warn!("Ignoring {}={:?}: expected milliseconds", ENV_DEBOUNCE_MS, raw),
            }
        }
        if let Some(raw) = lookup(ENV_FIRST_PAGE_STALE_SECS) {
            match parse_staleness(&raw) {
                Some(staleness) => self.first_page_staleness = staleness,
                None => warn!(
                    "Ignoring {}={:?}: expected seconds, \"always\" or \"never\"",
                    ENV_FIRST_PAGE_STALE_SECS, raw
                ),
            }
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.visibility_debounce_ms)
    }
}

fn parse_staleness(raw: &str) -> Option<Staleness> {
    match raw.trim() {
        "always" | "0" => Some(Staleness::Always),
        "never" => Some(Staleness::Never),
        secs => secs.parse().ok().map(Staleness::AfterSecs),
    }
}
