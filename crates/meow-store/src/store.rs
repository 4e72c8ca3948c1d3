use async_trait::async_trait;

use crate::{Meow, Result};

/// Read access to the authoritative meow records.
///
/// The query side never writes through this trait. All implementations must
/// be thread-safe (Send + Sync) since every request handler shares one handle.
#[async_trait]
pub trait MeowStore: Send + Sync {
    /// Lists meows in creation order.
    ///
    /// Ordering is `created_at` ascending with `id` ascending as tiebreak,
    /// so pages are stable across calls. Returns at most `limit` records
    /// starting after the first `offset`.
    async fn list_by_created_at(&self, offset: u64, limit: u64) -> Result<Vec<Meow>>;
}

/// Converts a page bound to a database integer, saturating at `i64::MAX`.
pub(crate) fn to_sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Converts a page bound to a slice index, saturating at `usize::MAX`.
pub(crate) fn to_index_bound(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_saturate() {
        assert_eq!(to_sql_bound(5), 5);
        assert_eq!(to_sql_bound(u64::MAX), i64::MAX);
        assert_eq!(to_index_bound(7), 7);
    }
}
