// ============================================================================
// RedbProfileStore — Embedded Profile Database (redb)
// ============================================================================
// Persistent storage for member profiles in insertion order.
// Cursors carry the insertion sequence, so a page can resume after a record
// that has since been deleted.
// Default path: ~/.profile-dir/profiles.redb (override via DIRECTORY_DB_PATH)
// ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{ProfileStore, StorePage};
use crate::types::{Cursor, ProfileRecord, StoreError};

/// Environment variable overriding the database location
pub const ENV_DB_PATH: &str = "DIRECTORY_DB_PATH";

// Table definitions
// Insertion sequence -> bincode-encoded ProfileRecord; key order is store order
const PROFILES: TableDefinition<u64, &[u8]> = TableDefinition::new("profiles");
// Profile id -> insertion sequence, for in-place replace, lookup and delete
const PROFILE_INDEX: TableDefinition<&str, u64> = TableDefinition::new("profile_index");
// Store counters; sequences are never reused, even after deletes
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_SEQUENCE: &str = "next_sequence";

/// Directory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_profiles: usize,
    pub owned_profiles: usize,
    pub profiles_with_images: usize,
}

/// Embedded profile database
pub struct RedbProfileStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbProfileStore {
    /// Open (or create) the database at the given path.
    /// If `path` is None, uses DIRECTORY_DB_PATH env var or ~/.profile-dir/profiles.redb
    pub fn open(path: Option<&str>) -> Result<Self> {
        let db_path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var(ENV_DB_PATH) {
            PathBuf::from(env_path)
        } else {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
            let dir = home.join(".profile-dir");
            std::fs::create_dir_all(&dir)
                .map_err(|e| anyhow!("Failed to create .profile-dir directory: {}", e))?;
            dir.join("profiles.redb")
        };

        info!("Opening profile database at: {}", db_path.display());

        let db = Database::create(&db_path)
            .map_err(|e| anyhow!("Failed to open database: {}", e))?;

        // Ensure tables exist by doing a write transaction
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(PROFILES)
                .map_err(|e| anyhow!("Failed to create profiles table: {}", e))?;
            let _ = write_txn
                .open_table(PROFILE_INDEX)
                .map_err(|e| anyhow!("Failed to create profile index: {}", e))?;
            let _ = write_txn
                .open_table(META)
                .map_err(|e| anyhow!("Failed to create meta table: {}", e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        Ok(Self {
            db: Arc::new(db),
            path: db_path,
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // Profile Operations
    // ========================================================================

    /// Insert a profile at the end of the store order.
    /// Re-inserting an existing id replaces the record in place.
    pub fn insert_profile(&self, profile: &ProfileRecord) -> Result<()> {
        let value = bincode::serialize(profile)
            .map_err(|e| anyhow!("Failed to serialize profile: {}", e))?;

        let write_txn = self.db.begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let mut index = write_txn.open_table(PROFILE_INDEX)
                .map_err(|e| anyhow!("Failed to open profile index: {}", e))?;
            let mut profiles = write_txn.open_table(PROFILES)
                .map_err(|e| anyhow!("Failed to open profiles table: {}", e))?;

            let existing = index
                .get(profile.id.as_str())
                .map_err(|e| anyhow!("Failed to read profile index: {}", e))?
                .map(|seq| seq.value());
            let seq = match existing {
                Some(seq) => seq,
                None => {
                    let mut meta = write_txn
                        .open_table(META)
                        .map_err(|e| anyhow!("Failed to open meta table: {}", e))?;
                    let next = meta
                        .get(NEXT_SEQUENCE)
                        .map_err(|e| anyhow!("Failed to read sequence: {}", e))?
                        .map(|v| v.value())
                        .unwrap_or(0);
                    meta.insert(NEXT_SEQUENCE, next + 1)
                        .map_err(|e| anyhow!("Failed to advance sequence: {}", e))?;
                    next
                }
            };

            profiles.insert(seq, value.as_slice())
                .map_err(|e| anyhow!("Failed to insert profile: {}", e))?;
            index.insert(profile.id.as_str(), seq)
                .map_err(|e| anyhow!("Failed to index profile: {}", e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit: {}", e))?;

        debug!("Stored profile: {}", profile.id);
        Ok(())
    }

    pub fn get_profile(&self, profile_id: &str) -> Result<Option<ProfileRecord>> {
        let read_txn = self.db.begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let index = read_txn.open_table(PROFILE_INDEX)
            .map_err(|e| anyhow!("Failed to open profile index: {}", e))?;
        let profiles = read_txn.open_table(PROFILES)
            .map_err(|e| anyhow!("Failed to open profiles table: {}", e))?;

        let seq = match index
            .get(profile_id)
            .map_err(|e| anyhow!("Failed to get profile: {}", e))?
        {
            Some(seq) => seq.value(),
            None => return Ok(None),
        };

        match profiles.get(seq).map_err(|e| anyhow!("Failed to get profile: {}", e))? {
            Some(value) => {
                let profile: ProfileRecord = bincode::deserialize(value.value())
                    .map_err(|e| anyhow!("Failed to deserialize profile: {}", e))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// All profiles in store order
    pub fn list_profiles(&self) -> Result<Vec<ProfileRecord>> {
        read_page(&self.db, usize::MAX, None)
            .map(|page| page.records)
            .map_err(|e| anyhow!("Failed to list profiles: {}", e))
    }

    pub fn delete_profile(&self, profile_id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        let removed;
        {
            let mut index = write_txn.open_table(PROFILE_INDEX)
                .map_err(|e| anyhow!("Failed to open profile index: {}", e))?;
            let mut profiles = write_txn.open_table(PROFILES)
                .map_err(|e| anyhow!("Failed to open profiles table: {}", e))?;

            let seq = index
                .remove(profile_id)
                .map_err(|e| anyhow!("Failed to remove profile index: {}", e))?
                .map(|seq| seq.value());
            removed = match seq {
                Some(seq) => profiles
                    .remove(seq)
                    .map_err(|e| anyhow!("Failed to remove profile: {}", e))?
                    .is_some(),
                None => false,
            };
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit delete: {}", e))?;

        if removed {
            debug!("Deleted profile: {}", profile_id);
        }
        Ok(removed)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn stats(&self) -> Result<StoreStats> {
        let profiles = self.list_profiles()?;
        Ok(StoreStats {
            total_profiles: profiles.len(),
            owned_profiles: profiles.iter().filter(|p| p.uid.is_some()).count(),
            profiles_with_images: profiles
                .iter()
                .filter(|p| !p.profile_images.is_empty())
                .count(),
        })
    }
}

// ============================================================================
// Paging
// ============================================================================

/// Decode a cursor issued by this store back into an insertion sequence
fn sequence_of(cursor: &Cursor) -> Result<u64, StoreError> {
    cursor
        .position()
        .parse::<u64>()
        .map_err(|_| StoreError::UnknownCursor(cursor.position().to_string()))
}

fn read_page(
    db: &Database,
    page_size: usize,
    after: Option<u64>,
) -> Result<StorePage, StoreError> {
    let read_txn = db
        .begin_read()
        .map_err(|e| StoreError::Storage(format!("Failed to begin read: {}", e)))?;
    let profiles = read_txn
        .open_table(PROFILES)
        .map_err(|e| StoreError::Storage(format!("Failed to open profiles table: {}", e)))?;

    let lower = match after {
        Some(seq) => Bound::Excluded(seq),
        None => Bound::Unbounded,
    };
    let iter = profiles
        .range::<u64>((lower, Bound::Unbounded))
        .map_err(|e| StoreError::Storage(format!("Failed to iterate profiles: {}", e)))?;

    let mut records = Vec::new();
    let mut last = None;
    for entry in iter.take(page_size) {
        let (key, value) =
            entry.map_err(|e| StoreError::Storage(format!("Failed to read entry: {}", e)))?;
        let profile: ProfileRecord =
            bincode::deserialize(value.value()).map_err(|e| StoreError::Codec(e.to_string()))?;
        records.push(profile);
        last = Some(key.value());
    }

    Ok(StorePage {
        records,
        last: last.map(|seq| Cursor::new(seq.to_string())),
    })
}

#[async_trait]
impl ProfileStore for RedbProfileStore {
    async fn query(
        &self,
        page_size: usize,
        after: Option<&Cursor>,
    ) -> Result<StorePage, StoreError> {
        let after = after.map(sequence_of).transpose()?;
        let db = Arc::clone(&self.db);

        // redb reads are blocking file I/O
        let page = tokio::task::spawn_blocking(move || read_page(&db, page_size, after))
            .await
            .map_err(|e| StoreError::Storage(format!("Profile read task failed: {}", e)))??;

        debug!("Profile database returned {} records", page.records.len());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (RedbProfileStore, PathBuf) {
        let path =
            std::env::temp_dir().join(format!("profile-dir-{}.redb", uuid::Uuid::new_v4()));
        let store = RedbProfileStore::open(path.to_str()).unwrap();
        (store, path)
    }

    fn seed(store: &RedbProfileStore, n: usize) {
        for i in 0..n {
            let profile = ProfileRecord::new(format!("m{}", i), format!("Member {}", i))
                .with_owner(format!("uid-{}", i));
            store.insert_profile(&profile).unwrap();
        }
    }

    #[test]
    fn test_insert_and_get() {
        let (store, path) = temp_store();
        let profile = ProfileRecord::new("m1", "Asha")
            .with_occupation("Engineer")
            .with_image("https://cdn.example/asha.jpg")
            .with_owner("uid-1");
        store.insert_profile(&profile).unwrap();

        assert_eq!(store.get_profile("m1").unwrap(), Some(profile));
        assert_eq!(store.get_profile("missing").unwrap(), None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_insertion_order_not_key_order() {
        let (store, path) = temp_store();
        for id in ["zeta", "alpha", "mid"] {
            store.insert_profile(&ProfileRecord::new(id, id)).unwrap();
        }

        let ids: Vec<_> = store.list_profiles().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let (store, path) = temp_store();
        seed(&store, 3);
        store
            .insert_profile(&ProfileRecord::new("m0", "Renamed"))
            .unwrap();

        let all = store.list_profiles().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].full_name, "Renamed");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_query_pages_with_cursor() {
        let (store, path) = temp_store();
        seed(&store, 12);

        let first = store.query(10, None).await.unwrap();
        assert_eq!(first.records.len(), 10);
        assert_eq!(first.last, Some(Cursor::new("9")));

        let second = store.query(8, first.last.as_ref()).await.unwrap();
        let ids: Vec<_> = second.records.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["m10", "m11"]);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_query_unreadable_cursor() {
        let (store, path) = temp_store();
        seed(&store, 2);
        let ghost = Cursor::new("ghost");
        let err = store.query(8, Some(&ghost)).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownCursor(_)));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_delete_and_stats() {
        let (store, path) = temp_store();
        seed(&store, 4);
        store
            .insert_profile(&ProfileRecord::new("anon", "No Owner").with_image("img.jpg"))
            .unwrap();

        assert!(store.delete_profile("m2").unwrap());
        assert!(!store.delete_profile("m2").unwrap());

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_profiles, 4);
        assert_eq!(stats.owned_profiles, 3);
        assert_eq!(stats.profiles_with_images, 1);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_cursor_survives_neighbour_delete() {
        let (store, path) = temp_store();
        seed(&store, 5);

        let first = store.query(2, None).await.unwrap();
        store.delete_profile("m2").unwrap();

        let next = store.query(2, first.last.as_ref()).await.unwrap();
        let ids: Vec<_> = next.records.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m4"]);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_cursor_survives_deleting_its_own_record() {
        let (store, path) = temp_store();
        seed(&store, 5);

        let first = store.query(2, None).await.unwrap();
        assert!(store.delete_profile("m1").unwrap());

        let next = store.query(2, first.last.as_ref()).await.unwrap();
        let ids: Vec<_> = next.records.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m3"]);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_sequence_keeps_growing_after_tail_delete() {
        let (store, path) = temp_store();
        seed(&store, 3);
        let first = store.query(3, None).await.unwrap();

        store.delete_profile("m2").unwrap();
        store.insert_profile(&ProfileRecord::new("late", "Late Joiner")).unwrap();

        let next = store.query(3, first.last.as_ref()).await.unwrap();
        let ids: Vec<_> = next.records.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["late"]);
        std::fs::remove_file(path).ok();
    }
}
