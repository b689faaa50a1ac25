//! ============================================================================
//! Store Module - Backing stores for member profiles
//! ============================================================================
//! The controller only needs one capability from a store: an ordered,
//! bounded query that can continue strictly after a cursor. The store hands
//! out the cursor itself, as the position of the last record it returned,
//! so paging keeps working when that record is removed. Two stores ship
//! with the crate:
//! - MemoryProfileStore: in-process, for tests and demos
//! - RedbProfileStore: embedded redb database on disk
//! ============================================================================

mod disk;
mod memory;

pub use disk::{RedbProfileStore, StoreStats, ENV_DB_PATH};
pub use memory::MemoryProfileStore;

use async_trait::async_trait;

use crate::types::{Cursor, ProfileRecord, StoreError};

/// Raw result of one store query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePage {
    /// Records in store order, before any viewer filtering
    pub records: Vec<ProfileRecord>,
    /// Position of the last record, None when the page is empty
    pub last: Option<Cursor>,
}

/// Ordered profile query with cursor continuation.
///
/// Implementations must keep a stable order: two calls with the same cursor
/// return the same sequence unless the data changed in between.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Up to `page_size` records in store order, strictly after `after` when given
    async fn query(
        &self,
        page_size: usize,
        after: Option<&Cursor>,
    ) -> Result<StorePage, StoreError>;
}
