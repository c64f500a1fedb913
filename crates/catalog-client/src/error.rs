//! Errors raised by the catalog client

use sources::{Cursor, FetchError, Selector};
use thiserror::Error;
use tonic::Code;

/// Errors that can occur when talking to the catalog service
#[derive(Error, Debug)]
pub enum CatalogClientError {
    #[error("Catalog request failed: {0}")]
    RequestError(#[from] tonic::Status),

    #[error("Invalid response from catalog service: {0}")]
    InvalidResponse(String),
}

impl CatalogClientError {
    /// Map onto the page-source error a list controller understands
    pub fn into_fetch_error(self, cursor: Option<Cursor>, selector: &Selector) -> FetchError {
        match self {
            CatalogClientError::RequestError(status) if status.code() == Code::OutOfRange => {
                FetchError::InvalidCursor {
                    cursor: cursor.unwrap_or(Cursor(0)),
                    selector: selector.to_string(),
                }
            }
            CatalogClientError::RequestError(status) => FetchError::Unavailable(format!(
                "{:?}: {}",
                status.code(),
                status.message()
            )),
            CatalogClientError::InvalidResponse(message) => FetchError::InvalidResponse(message),
        }
    }
}
