use common::{ErrorKind, MeowId};
use thiserror::Error;

/// Errors that can occur while subscribing to or reading from a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A delivered payload could not be decoded into a change event.
    #[error("Malformed event payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A notice referred to a record the system of record does not hold.
    #[error("No record for notified meow {0}")]
    MissingRecord(MeowId),

    /// The database backing the feed failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The feed has no remaining subscriber or publisher.
    #[error("Feed closed")]
    Closed,

    /// An in-process feed only hands out its receiver once.
    #[error("Feed already has a subscriber")]
    AlreadySubscribed,
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::Decode(_) | FeedError::MissingRecord(_) | FeedError::AlreadySubscribed => {
                ErrorKind::Client
            }
            FeedError::Database(_) | FeedError::Closed => ErrorKind::BackendUnavailable,
        }
    }
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
