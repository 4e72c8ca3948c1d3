//! Query error types.

use std::time::Duration;

use common::ErrorKind;
use meow_store::StoreError;
use search_index::IndexError;
use thiserror::Error;

/// Malformed or missing request parameters.
///
/// Messages are shown to callers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Missing query parameter")]
    MissingQuery,

    #[error("Invalid skip parameter")]
    InvalidSkip,

    #[error("Invalid take parameter")]
    InvalidTake,
}

/// The external service a query was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    SearchIndex,
    Store,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::SearchIndex => f.write_str("search index"),
            Backend::Store => f.write_str("system of record"),
        }
    }
}

/// Errors that can occur while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Search index unavailable: {0}")]
    Index(#[from] IndexError),

    #[error("System of record unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("{backend} timed out after {timeout:?}")]
    Timeout { backend: Backend, timeout: Duration },
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Client(_) => ErrorKind::Client,
            QueryError::Index(e) => e.kind(),
            QueryError::Store(e) => e.kind(),
            QueryError::Timeout { .. } => ErrorKind::BackendUnavailable,
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        assert_eq!(
            ClientError::MissingQuery.to_string(),
            "Missing query parameter"
        );
        assert_eq!(ClientError::InvalidSkip.to_string(), "Invalid skip parameter");
        assert_eq!(ClientError::InvalidTake.to_string(), "Invalid take parameter");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            QueryError::from(ClientError::InvalidTake).kind(),
            ErrorKind::Client
        );
        assert_eq!(
            QueryError::from(IndexError::Unavailable("down".into())).kind(),
            ErrorKind::BackendUnavailable
        );
        let timeout = QueryError::Timeout {
            backend: Backend::Store,
            timeout: Duration::from_millis(10),
        };
        assert_eq!(timeout.kind(), ErrorKind::BackendUnavailable);
        assert_eq!(timeout.to_string(), "system of record timed out after 10ms");
    }
}
