//! Uniform success/error shape for query outcomes.

use crate::QueryError;

/// Message shown when listing fails on the server side.
pub const LIST_FAILED_MESSAGE: &str = "Could not fetch meows";

/// Transport-independent error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    BadRequest,
    Internal,
}

/// Exactly one of a typed success body or a single error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Ok(T),
    Error { status: Status, message: String },
}

impl<T> Envelope<T> {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Envelope::Error {
            status: Status::BadRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Envelope::Error {
            status: Status::Internal,
            message: message.into(),
        }
    }
}

impl<T> From<QueryError> for Envelope<T> {
    /// Client errors keep their message; backend details stay in the logs.
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Client(client) => Envelope::bad_request(client.to_string()),
            _ => Envelope::internal(LIST_FAILED_MESSAGE),
        }
    }
}
