use common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when talking to the search index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The HTTP request to the search engine failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The search engine answered with a non-success status.
    #[error("Search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The search engine response could not be decoded.
    #[error("Malformed search response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The configured engine URL cannot address documents.
    #[error("Invalid index URL: {0}")]
    InvalidUrl(String),

    /// The index refused the request.
    #[error("Index unavailable: {0}")]
    Unavailable(String),
}

impl IndexError {
    /// Every index failure means the index could not answer.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BackendUnavailable
    }
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
