//! Error types for the cache store

/// Result type alias for cache store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the cache store
///
/// Every variant is treated as a cache miss by read-aside callers; only
/// the cache administration endpoints surface these errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying storage unavailable or corrupted
    #[error("store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    /// Stored value is not valid JSON
    #[error("invalid cached value: {0}")]
    InvalidValue(#[from] serde_json::Error),
}
