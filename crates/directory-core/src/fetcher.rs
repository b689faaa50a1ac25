//! ============================================================================
//! Page Fetcher - One bounded store query per page
//! ============================================================================
//! Issues a single query, drops the viewer's own profile, and advances the
//! cursor along the raw store order:
//! - The cursor is the store's position of the last RAW record, so
//!   self-exclusion never makes the next page skip or repeat store records
//! - A short raw page (fewer than requested) means the store is exhausted
//! - Self-exclusion can shrink a page; it is not topped up
//! - Store errors surface as FetchFailed, never retried here
//! ============================================================================

use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::{ProfileStore, StorePage};
use crate::types::{Cursor, FetchError, ProfileRecord, Viewer};

/// Result of one page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Records visible to the viewer, in store order
    pub records: Vec<ProfileRecord>,
    /// Continuation after this page, None once the store is exhausted
    pub new_cursor: Option<Cursor>,
    /// Records the store returned before self-exclusion
    pub raw_count: usize,
}

/// Fetches pages from a profile store on behalf of one viewer at a time
#[derive(Clone)]
pub struct PageFetcher {
    store: Arc<dyn ProfileStore>,
}

impl PageFetcher {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fetch up to `page_size` records after `cursor` (from the start when None)
    pub async fn fetch(
        &self,
        cursor: Option<&Cursor>,
        page_size: usize,
        viewer: &Viewer,
    ) -> Result<FetchedPage, FetchError> {
        let StorePage { records: raw, last } =
            self.store.query(page_size, cursor).await.map_err(|e| {
                warn!("Profile query failed (page_size={}): {}", page_size, e);
                FetchError::from(e)
            })?;

        let raw_count = raw.len();
        let new_cursor = if raw_count < page_size { None } else { last };

        let records: Vec<ProfileRecord> = match viewer.identity() {
            Some(identity) => raw.into_iter().filter(|r| !r.is_owned_by(identity)).collect(),
            None => raw,
        };

        debug!(
            "Fetched {} raw / {} visible profiles for {} (exhausted: {})",
            raw_count,
            records.len(),
            viewer,
            new_cursor.is_none()
        );

        Ok(FetchedPage {
            records,
            new_cursor,
            raw_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProfileStore;
    use crate::types::StoreError;

    fn store_with(n: usize, owner_at: Option<usize>) -> Arc<MemoryProfileStore> {
        let records = (0..n)
            .map(|i| {
                let r = ProfileRecord::new(format!("p{}", i), format!("Member {}", i));
                if Some(i) == owner_at {
                    r.with_owner("me")
                } else {
                    r.with_owner(format!("uid-{}", i))
                }
            })
            .collect();
        Arc::new(MemoryProfileStore::new(records))
    }

    #[tokio::test]
    async fn test_full_page_sets_cursor_to_last_record() {
        let fetcher = PageFetcher::new(store_with(25, None));
        let page = fetcher.fetch(None, 10, &Viewer::Anonymous).await.unwrap();

        assert_eq!(page.records.len(), 10);
        assert_eq!(page.raw_count, 10);
        assert_eq!(page.new_cursor, Some(Cursor::new("9")));
    }

    #[tokio::test]
    async fn test_short_page_exhausts() {
        let store = store_with(12, None);
        let fetcher = PageFetcher::new(store);
        let first = fetcher.fetch(None, 10, &Viewer::Anonymous).await.unwrap();
        let second = fetcher
            .fetch(first.new_cursor.as_ref(), 8, &Viewer::Anonymous)
            .await
            .unwrap();

        assert_eq!(second.raw_count, 2);
        assert_eq!(second.records.len(), 2);
        assert_eq!(second.new_cursor, None);
    }

    #[tokio::test]
    async fn test_empty_store_exhausts() {
        let fetcher = PageFetcher::new(store_with(0, None));
        let page = fetcher.fetch(None, 10, &Viewer::Anonymous).await.unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.new_cursor, None);
    }

    #[tokio::test]
    async fn test_self_exclusion_keeps_raw_cursor() {
        // Viewer owns the last record of the page: it is hidden, but the
        // cursor still points at it so the next page starts after it
        let fetcher = PageFetcher::new(store_with(25, Some(9)));
        let me = Viewer::authenticated("me");

        let page = fetcher.fetch(None, 10, &me).await.unwrap();
        assert_eq!(page.records.len(), 9);
        assert_eq!(page.raw_count, 10);
        assert!(page.records.iter().all(|r| !r.is_owned_by("me")));
        assert_eq!(page.new_cursor, Some(Cursor::new("9")));

        let next = fetcher.fetch(page.new_cursor.as_ref(), 8, &me).await.unwrap();
        assert_eq!(next.records.first().map(|r| r.id.as_str()), Some("p10"));
    }

    #[tokio::test]
    async fn test_self_exclusion_does_not_trigger_exhaustion() {
        // 10 raw records with one of them the viewer's: page is short after
        // filtering but the raw count still says "more may follow"
        let fetcher = PageFetcher::new(store_with(20, Some(3)));
        let page = fetcher
            .fetch(None, 10, &Viewer::authenticated("me"))
            .await
            .unwrap();
        assert_eq!(page.records.len(), 9);
        assert!(page.new_cursor.is_some());
    }

    #[tokio::test]
    async fn test_guest_sees_everything() {
        let fetcher = PageFetcher::new(store_with(10, Some(0)));
        let page = fetcher.fetch(None, 10, &Viewer::Anonymous).await.unwrap();
        assert_eq!(page.records.len(), 10);
    }

    #[tokio::test]
    async fn test_store_failure_reported() {
        let store = store_with(10, None);
        store.set_available(false);
        let fetcher = PageFetcher::new(store);

        let err = fetcher.fetch(None, 10, &Viewer::Anonymous).await.unwrap_err();
        assert!(matches!(err, FetchError::FetchFailed(StoreError::Unavailable(_))));
    }
}
