//! Error types for page sources

use crate::types::Cursor;
use thiserror::Error;

/// Failure of a single page request.
///
/// Cloneable so a controller can keep the last failure around for display
/// while the same request is retried later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Page source unavailable: {0}")]
    Unavailable(String),

    #[error("Cursor {cursor} is past the end of {selector}")]
    InvalidCursor { cursor: Cursor, selector: String },

    #[error("Invalid response from page source: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
