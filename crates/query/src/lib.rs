//! Read side of the meow service.
//!
//! - [`Pagination`]: shared `skip`/`take` parsing, defaults, and clamping
//! - [`QueryGateway`]: full-text search against the index (degrades to empty on
//!   failure) and chronological listing against the system of record (fails visibly)
//! - [`Envelope`]: the single success-or-error shape every handler returns

pub mod envelope;
pub mod error;
pub mod gateway;
pub mod pagination;

pub use envelope::{Envelope, Status};
pub use error::{Backend, ClientError, QueryError, Result};
pub use gateway::{GatewayConfig, QueryGateway};
pub use pagination::{ListParams, Pagination, SearchParams, SearchRequest};
