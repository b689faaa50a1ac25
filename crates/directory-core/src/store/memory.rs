//! In-memory profile store backed by an ordered Vec.
//! Cursor positions are Vec indices; records are never removed.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::{ProfileStore, StorePage};
use crate::types::{Cursor, ProfileRecord, StoreError};

/// Insertion-ordered store held in process memory
pub struct MemoryProfileStore {
    records: RwLock<Vec<ProfileRecord>>,
    available: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new(records: Vec<ProfileRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: queries fail with `StoreError::Unavailable` while false
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn query(
        &self,
        page_size: usize,
        after: Option<&Cursor>,
    ) -> Result<StorePage, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }

        let start = match after {
            None => 0,
            Some(cursor) => cursor
                .position()
                .parse::<usize>()
                .map_err(|_| StoreError::UnknownCursor(cursor.position().to_string()))?
                .saturating_add(1),
        };

        let records = self.records.read().await;
        let page: Vec<ProfileRecord> =
            records.iter().skip(start).take(page_size).cloned().collect();
        let last = page
            .len()
            .checked_sub(1)
            .map(|offset| Cursor::new((start + offset).to_string()));

        debug!("Memory store returned {} records from offset {}", page.len(), start);
        Ok(StorePage {
            records: page,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<ProfileRecord> {
        (0..n)
            .map(|i| ProfileRecord::new(format!("p{:02}", i), format!("Member {}", i)))
            .collect()
    }

    fn ids(page: &StorePage) -> Vec<&str> {
        page.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_query_first_page() {
        let store = MemoryProfileStore::new(sample(5));
        let page = store.query(3, None).await.unwrap();
        assert_eq!(ids(&page), vec!["p00", "p01", "p02"]);
        assert_eq!(page.last, Some(Cursor::new("2")));
    }

    #[tokio::test]
    async fn test_query_continues_after_cursor() {
        let store = MemoryProfileStore::new(sample(5));
        let first = store.query(3, None).await.unwrap();

        let rest = store.query(3, first.last.as_ref()).await.unwrap();
        assert_eq!(ids(&rest), vec!["p03", "p04"]);

        let tail = store.query(3, rest.last.as_ref()).await.unwrap();
        assert!(tail.records.is_empty());
        assert_eq!(tail.last, None);
    }

    #[tokio::test]
    async fn test_unreadable_cursor() {
        let store = MemoryProfileStore::new(sample(2));
        let ghost = Cursor::new("ghost");
        let err = store.query(3, Some(&ghost)).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownCursor("ghost".into()));
    }

    #[tokio::test]
    async fn test_outage_is_transient() {
        let store = MemoryProfileStore::new(sample(2));
        store.set_available(false);
        let err = store.query(3, None).await.unwrap_err();
        assert!(err.is_transient());

        store.set_available(true);
        assert_eq!(store.query(3, None).await.unwrap().records.len(), 2);
    }
}
