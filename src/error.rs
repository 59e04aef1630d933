//! Error types for the timeline panel and its export pipelines

use thiserror::Error;

/// Result type alias for timeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or exporting the timeline
#[derive(Error, Debug)]
pub enum Error {
    /// The capture target was not present in the live tree at invocation
    /// time. Fatal; raised before any tree mutation happens.
    #[error("capture target `{0}` not found")]
    TargetNotFound(String),

    /// The external rasterizer rejected the composed scene or failed to
    /// encode it. Restoration of the live tree still runs.
    #[error("rasterization failed: {0}")]
    Rasterization(String),

    /// A date string did not parse as ISO-8601 (`YYYY-MM-DD`)
    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// Structured import rejected the file
    #[error("import failed: {0}")]
    Import(String),

    /// Filesystem error while emitting a download
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
