//! Error types for the screenpick-core library.
//!
//! All fallible operations in the core return [`CoreResult`]. Cache and sidecar
//! reads never surface these errors to callers; they are folded into a
//! [`CacheLoadResult`](crate::cache::CacheLoadResult) or an empty `Option`
//! instead, so only configuration, window and sampling problems are fatal.

use thiserror::Error;

/// Errors produced by the frame selection engine.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid frame window: start {start} must be below end {end}")]
    InvalidWindow { start: usize, end: usize },

    #[error("Cannot compute {0} of an empty data set")]
    EmptyData(&'static str),

    #[error("Quantile {0} is outside [0, 1]")]
    InvalidQuantile(f64),

    #[error("Metric sampling failed: none of the {requested} requested frames produced a sample")]
    SamplingFailed { requested: usize },

    #[error("Frame source error: {0}")]
    FrameSource(String),

    #[error("Path error: {0}")]
    PathError(String),
}

/// Result type for screenpick-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::Config`] from anything displayable.
pub(crate) fn config_error(msg: impl Into<String>) -> CoreError {
    CoreError::Config(msg.into())
}
