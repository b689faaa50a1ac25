//! ============================================================================
//! DIRECTORY-CORE: Featured Members Directory
//! ============================================================================
//! Tiered pagination for the featured members section:
//! - Access gate deciding permit vs redirect before any fetch
//! - Page fetcher with self-exclusion and raw-order cursors
//! - Accumulated member list and "load more" usage per session
//! - Profile stores (in-memory, embedded redb)
//! ============================================================================

pub mod access;
pub mod config;
pub mod controller;
pub mod fetcher;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use types::*;
pub use access::{AccessGate, GateDecision, RedirectTarget};
pub use config::{ConfigError, DirectoryConfig};
pub use controller::{BrowseController, GestureOutcome, Navigator};
pub use fetcher::{FetchedPage, PageFetcher};
pub use session::{BrowseSession, IgnoreReason, Phase};
pub use state::{AccumulationState, UsageCounter};
pub use store::{MemoryProfileStore, ProfileStore, RedbProfileStore, StorePage, StoreStats};
pub use view::{DirectorySnapshot, LoadMoreLabel, ProfileCard};
