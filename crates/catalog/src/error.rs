//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while loading or validating catalog fixtures.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Fixture directory or file could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a fixture
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A fixture file was not valid JSON for the expected record shape
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A record field had an out-of-range value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two records of the same kind share an id
    #[error("Duplicate {entity} id {id}")]
    DuplicateId { entity: String, id: u64 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
