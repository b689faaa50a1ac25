//! ============================================================================
//! Browse Controller - Drives a browse session against a store and a router
//! ============================================================================
//! Gestures arrive one at a time from the presentation layer. The session
//! lock is held only around `begin` and `complete`, never across the store
//! call, so a second gesture during a fetch sees the busy guard and is
//! dropped.
//! ============================================================================

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::access::RedirectTarget;
use crate::config::DirectoryConfig;
use crate::fetcher::PageFetcher;
use crate::session::{BrowseSession, Completion, IgnoreReason, Step};
use crate::store::ProfileStore;
use crate::types::{FetchError, RequestKind, Viewer};
use crate::view::DirectorySnapshot;

/// Router call-out used for redirects
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Result of one gesture, for callers that want more than a re-render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Page applied; `exhausted` is true when no further page exists
    Loaded { appended: usize, exhausted: bool },
    Redirected(RedirectTarget),
    Ignored(IgnoreReason),
    /// Store failed; accumulated state untouched
    Failed(FetchError),
    /// Viewer changed mid-flight; result dropped
    Discarded,
}

/// Tiered pagination controller for one mounted directory view
pub struct BrowseController {
    session: Mutex<BrowseSession>,
    fetcher: PageFetcher,
    navigator: Arc<dyn Navigator>,
    config: DirectoryConfig,
}

impl BrowseController {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        navigator: Arc<dyn Navigator>,
        config: DirectoryConfig,
        viewer: Viewer,
    ) -> Self {
        Self {
            session: Mutex::new(BrowseSession::new(viewer, config.clone())),
            fetcher: PageFetcher::new(store),
            navigator,
            config,
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Load the first page. Runs on mount and after every viewer change.
    pub async fn load_initial(&self) -> GestureOutcome {
        self.run(RequestKind::Initial).await
    }

    /// The "load more" gesture
    pub async fn request_more(&self) -> GestureOutcome {
        self.run(RequestKind::LoadMore).await
    }

    /// Apply a viewer change. Returns true when the identity actually changed.
    pub async fn set_viewer(&self, viewer: Viewer) -> bool {
        self.session.lock().await.change_viewer(viewer)
    }

    pub async fn viewer(&self) -> Viewer {
        self.session.lock().await.viewer().clone()
    }

    pub async fn snapshot(&self) -> DirectorySnapshot {
        self.session.lock().await.snapshot()
    }

    /// Track the session provider: load for the current viewer, then reset
    /// and reload on every identity change until the provider goes away.
    ///
    /// Initial loads run as separate tasks so a change can land while a
    /// previous load is still in flight; that load is then discarded.
    pub async fn follow_viewer(self: Arc<Self>, mut viewer_rx: watch::Receiver<Viewer>) {
        let current = viewer_rx.borrow_and_update().clone();
        self.set_viewer(current).await;
        self.spawn_initial_load();

        while viewer_rx.changed().await.is_ok() {
            let viewer = viewer_rx.borrow_and_update().clone();
            if self.set_viewer(viewer).await {
                self.spawn_initial_load();
            }
        }
        debug!("Viewer provider closed, no longer following");
    }

    fn spawn_initial_load(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = this.load_initial().await;
            debug!("Initial load finished: {:?}", outcome);
        });
    }

    async fn run(&self, kind: RequestKind) -> GestureOutcome {
        let step = { self.session.lock().await.begin(kind) };

        let ticket = match step {
            Step::Ignored(reason) => return GestureOutcome::Ignored(reason),
            Step::Redirect(target) => {
                let path = self.config.path_for(target);
                info!("Navigating to {}", path);
                self.navigator.navigate(path);
                return GestureOutcome::Redirected(target);
            }
            Step::Fetch(ticket) => ticket,
        };

        let result = self
            .fetcher
            .fetch(ticket.cursor.as_ref(), ticket.page_size, &ticket.viewer)
            .await;

        let mut session = self.session.lock().await;
        match session.complete(ticket, result) {
            Completion::Applied { appended } => GestureOutcome::Loaded {
                appended,
                exhausted: !session.state().can_load_more(),
            },
            Completion::Failed(e) => GestureOutcome::Failed(e),
            Completion::Stale => GestureOutcome::Discarded,
        }
    }
}
