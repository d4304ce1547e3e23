//! Error types for query resolution

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a query
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The search tool failed or returned unusable metadata
    #[error("metadata resolution failed: {0}")]
    Resolution(String),

    /// The search tool produced no usable stream locator
    #[error("stream locator resolution failed: {0}")]
    Locator(String),

    /// The search tool could not be started or timed out
    #[error(transparent)]
    Tool(#[from] muztool::Error),
}
