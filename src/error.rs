//! Error types for the analyzer pipeline

use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analyzing a page
#[derive(Error, Debug)]
pub enum Error {
    /// The input URL is malformed or unsafe; rejected before any network I/O
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport or status failure while fetching the page or an image
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The rendering pass timed out or errored
    #[error("Render failed: {0}")]
    Render(String),

    /// Unexpected failure anywhere in the pipeline
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable kind, used in API error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "invalid_url",
            Error::Fetch(_) => "fetch_failure",
            Error::Render(_) => "render_failure",
            Error::Internal(_) => "internal_error",
        }
    }
}
