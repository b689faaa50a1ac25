//! ============================================================================
//! Accumulation State - Visible members, cursor and usage count
//! ============================================================================
//! Owned by exactly one browsing session. Reset only as a whole, when the
//! viewer identity changes.
//! ============================================================================

use tracing::debug;

use crate::fetcher::FetchedPage;
use crate::types::{Cursor, ProfileRecord, RequestKind};

/// Successful "load more" fetches in the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageCounter(u32);

impl UsageCounter {
    pub fn get(&self) -> u32 {
        self.0
    }

    fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

/// Members shown so far, plus the store position to continue from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulationState {
    members: Vec<ProfileRecord>,
    cursor: Option<Cursor>,
    usage: UsageCounter,
}

impl AccumulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a successful fetch.
    /// Initial pages replace the list; load-more pages append and count.
    pub fn apply(&mut self, kind: RequestKind, page: FetchedPage) {
        let FetchedPage {
            records,
            new_cursor,
            ..
        } = page;

        match kind {
            RequestKind::Initial => {
                self.members = records;
            }
            RequestKind::LoadMore => {
                self.members.extend(records);
                self.usage.increment();
            }
        }
        self.cursor = new_cursor;

        debug!(
            "Applied {:?} page: {} members, usage {}, more: {}",
            kind,
            self.members.len(),
            self.usage.get(),
            self.cursor.is_some()
        );
    }

    /// Drop everything, as on a viewer change
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn members(&self) -> &[ProfileRecord] {
        &self.members
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn usage(&self) -> u32 {
        self.usage.get()
    }

    /// True while the store may still have records past the cursor
    pub fn can_load_more(&self) -> bool {
        self.cursor.is_some()
    }
}
