//! Search index access for the query side.
//!
//! - [`SearchIndex`] trait: idempotent upsert and ranked, paginated queries
//! - [`InMemorySearchIndex`]: BM25-scored inverted index used by tests and local runs
//! - [`ElasticsearchIndex`]: HTTP adapter for an Elasticsearch cluster

pub mod elasticsearch;
pub mod error;
pub mod index;
pub mod memory;
pub mod tokenizer;

pub use common::{Meow, MeowId};
pub use elasticsearch::ElasticsearchIndex;
pub use error::{IndexError, Result};
pub use index::SearchIndex;
pub use memory::InMemorySearchIndex;
