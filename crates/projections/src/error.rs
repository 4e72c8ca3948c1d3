//! Projection error types.

use std::time::Duration;

use common::{ErrorKind, MeowId};
use event_feed::FeedError;
use search_index::IndexError;
use thiserror::Error;

/// Errors that can occur while projecting a change event.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The event payload cannot be turned into a record.
    #[error("Malformed event {id:?}: {reason}")]
    MalformedEvent { id: MeowId, reason: String },

    /// The search index rejected or failed the upsert.
    #[error("Search index unavailable: {0}")]
    Index(#[from] IndexError),

    /// The search index did not answer in time.
    #[error("Search index upsert timed out after {0:?}")]
    Timeout(Duration),

    /// The event kind is not safe to apply as an upsert.
    #[error("Event kind {kind} cannot be applied idempotently")]
    NotIdempotentConflict { kind: String },

    /// The feed delivered something that is not an event.
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

impl ProjectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProjectionError::MalformedEvent { .. } => ErrorKind::Client,
            ProjectionError::Index(_) | ProjectionError::Timeout(_) => {
                ErrorKind::BackendUnavailable
            }
            ProjectionError::NotIdempotentConflict { .. } => ErrorKind::NotIdempotentConflict,
            ProjectionError::Feed(err) => err.kind(),
        }
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
