//! Error types for geotable.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors returned by geotable operations.
///
/// Nothing is retried or swallowed inside the crate; every failure reaches
/// the caller as one of these variants.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Malformed coordinates, radius, identifier or configuration. Raised
    /// before any backend call is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend failed (timeout, throttling, connectivity). A single
    /// failed range scan fails the whole query.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("serialization error: {0}")]
    SerializationErrorWithContext(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeoError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GeoError::InvalidInput(_))
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, GeoError::BackendUnavailable(_))
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::SerializationErrorWithContext(err.to_string())
    }
}
