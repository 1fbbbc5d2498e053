//! Error types for the catalog client.

use cadence_core::CadenceError;
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed (connection refused, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with an unexpected status
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Requested entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}

impl From<CatalogError> for CadenceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { entity, id } => CadenceError::not_found(entity, id),
            CatalogError::InvalidInput(msg) => CadenceError::InvalidInput(msg),
            CatalogError::InvalidUrl(msg) => CadenceError::Config(msg),
            other => CadenceError::network(other.to_string()),
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
