use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{MeowStore, to_index_bound};
use crate::{Meow, Result};

/// In-memory system of record for tests and local runs.
///
/// Records are kept sorted by `(created_at, id)`, so listing is a slice.
#[derive(Clone, Default)]
pub struct InMemoryMeowStore {
    meows: Arc<RwLock<Vec<Meow>>>,
}

impl InMemoryMeowStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any existing record with the same ID.
    pub async fn insert(&self, meow: Meow) {
        let mut meows = self.meows.write().await;
        meows.retain(|m| m.id != meow.id);
        let pos = meows
            .binary_search_by(|m| {
                m.created_at
                    .cmp(&meow.created_at)
                    .then_with(|| m.id.cmp(&meow.id))
            })
            .unwrap_or_else(|pos| pos);
        meows.insert(pos, meow);
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.meows.read().await.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.meows.read().await.is_empty()
    }
}

#[async_trait]
impl MeowStore for InMemoryMeowStore {
    async fn list_by_created_at(&self, offset: u64, limit: u64) -> Result<Vec<Meow>> {
        let meows = self.meows.read().await;
        Ok(meows
            .iter()
            .skip(to_index_bound(offset))
            .take(to_index_bound(limit))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn meow(id: &str, minutes: i64) -> Meow {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Meow::new(id, format!("body of {id}"), base + Duration::minutes(minutes))
    }

    fn ids(meows: &[Meow]) -> Vec<&str> {
        meows.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_lists_in_creation_order() {
        let store = InMemoryMeowStore::new();
        store.insert(meow("c", 3)).await;
        store.insert(meow("a", 1)).await;
        store.insert(meow("b", 2)).await;

        let all = store.list_by_created_at(0, 10).await.unwrap();
        assert_eq!(ids(&all), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_break_ties_by_id() {
        let store = InMemoryMeowStore::new();
        store.insert(meow("y", 1)).await;
        store.insert(meow("x", 1)).await;

        let all = store.list_by_created_at(0, 10).await.unwrap();
        assert_eq!(ids(&all), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_offset_and_limit_bound_the_page() {
        let store = InMemoryMeowStore::new();
        for i in 0..5 {
            store.insert(meow(&format!("m{i}"), i)).await;
        }

        let page = store.list_by_created_at(1, 2).await.unwrap();
        assert_eq!(ids(&page), vec!["m1", "m2"]);

        let past_end = store.list_by_created_at(10, 2).await.unwrap();
        assert!(past_end.is_empty());

        let huge = store.list_by_created_at(u64::MAX, u64::MAX).await.unwrap();
        assert!(huge.is_empty());
    }

    #[tokio::test]
    async fn test_insert_replaces_same_id() {
        let store = InMemoryMeowStore::new();
        store.insert(meow("a", 1)).await;
        store.insert(meow("a", 1)).await;
        assert_eq!(store.len().await, 1);
    }
}
