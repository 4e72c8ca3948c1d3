use async_trait::async_trait;

use crate::{Meow, Result};

/// A full-text index of meows.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Inserts the record or replaces the one with the same ID.
    ///
    /// Repeating an upsert leaves exactly one entry for the ID.
    async fn upsert(&self, meow: &Meow) -> Result<()>;

    /// Runs a ranked full-text query and returns at most `limit` records
    /// after skipping the first `offset`.
    ///
    /// Ranking is relevance descending with `id` ascending as tiebreak.
    async fn query(&self, text: &str, offset: u64, limit: u64) -> Result<Vec<Meow>>;
}
