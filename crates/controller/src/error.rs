//! Error types for list controllers

use sources::{Cursor, FetchError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// A page request failed. Nothing was appended and the cursor did not
    /// move, so the same page is requested again on the next trigger.
    #[error("Fetching page at cursor {} failed: {source}", display_cursor(.cursor))]
    FetchFailed {
        cursor: Option<Cursor>,
        source: FetchError,
    },

    #[error("List session has shut down")]
    SessionClosed,
}

fn display_cursor(cursor: &Option<Cursor>) -> String {
    cursor.map_or_else(|| "start".to_string(), |c| c.to_string())
}

pub type Result<T> = std::result::Result<T, ControllerError>;
