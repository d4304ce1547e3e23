//! Error types for the transcode pipeline

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when opening a transcode pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transcoder binary could not be started
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The transcoder started but its output pipe is unusable
    #[error("transcoder pipeline failed: {0}")]
    Transcode(String),
}
