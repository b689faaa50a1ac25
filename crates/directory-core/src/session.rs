//! ============================================================================
//! Browse Session - Gate, single-flight guard and apply step
//! ============================================================================
//! A session is split into two synchronous halves around the store call:
//!
//! ```text
//!   begin(kind) ──► Ignored | Redirect(target) | Fetch(ticket)
//!                                                   │  (store call, no lock held)
//!   complete(ticket, result) ◄──────────────────────┘
//! ```
//!
//! Tickets carry the generation they were issued under. A viewer change
//! bumps the generation, so a page fetched for the previous identity is
//! dropped instead of merged.
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::access::{AccessGate, GateDecision, RedirectTarget};
use crate::config::DirectoryConfig;
use crate::fetcher::FetchedPage;
use crate::state::AccumulationState;
use crate::types::{Cursor, FetchError, RequestKind, Viewer};
use crate::view::{DirectorySnapshot, LoadMoreLabel};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing loaded yet (or the initial load failed)
    Idle,
    LoadingInitial,
    /// Data on screen, accepting gestures
    Ready,
    LoadingMore,
    /// Handed off to another surface; terminal
    Redirected(RedirectTarget),
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::LoadingInitial | Phase::LoadingMore)
    }
}

/// Why a gesture was dropped without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A fetch is already in flight
    Busy,
    /// "Load more" before the first page landed
    NotReady,
    /// The store has no records past the cursor
    Exhausted,
    /// The session already redirected
    Redirected,
}

/// Permission to run one store query, redeemed by `complete`
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    pub kind: RequestKind,
    pub cursor: Option<Cursor>,
    pub page_size: usize,
    /// Viewer at initiation; self-exclusion uses this identity
    pub viewer: Viewer,
}

/// What `begin` decided
#[derive(Debug)]
pub enum Step {
    Fetch(FetchTicket),
    Redirect(RedirectTarget),
    Ignored(IgnoreReason),
}

/// What `complete` did with a fetch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied { appended: usize },
    Failed(FetchError),
    /// Ticket predates a viewer change; nothing applied
    Stale,
}

/// Per-viewer browsing state
pub struct BrowseSession {
    id: Uuid,
    generation: u64,
    viewer: Viewer,
    phase: Phase,
    state: AccumulationState,
    gate: AccessGate,
    config: DirectoryConfig,
}

impl BrowseSession {
    pub fn new(viewer: Viewer, config: DirectoryConfig) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            generation: 0,
            viewer,
            phase: Phase::Idle,
            state: AccumulationState::new(),
            gate: config.access_gate(),
            config,
        };
        debug!("Browse session {} opened for {}", session.id, session.viewer);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &AccumulationState {
        &self.state
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Data loaded and no cursor left
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Ready && !self.state.can_load_more()
    }

    /// Start a request. The gate runs before any store call.
    pub fn begin(&mut self, kind: RequestKind) -> Step {
        if self.phase.is_busy() {
            debug!("Session {}: {:?} ignored, fetch in flight", self.id, kind);
            return Step::Ignored(IgnoreReason::Busy);
        }
        if let Phase::Redirected(_) = self.phase {
            return Step::Ignored(IgnoreReason::Redirected);
        }

        if kind == RequestKind::LoadMore {
            if self.phase == Phase::Idle {
                return Step::Ignored(IgnoreReason::NotReady);
            }
            if self.is_exhausted() {
                debug!("Session {}: load more ignored, store exhausted", self.id);
                return Step::Ignored(IgnoreReason::Exhausted);
            }
        }

        match self.gate.decide(kind, &self.viewer, self.state.usage()) {
            GateDecision::Redirect(target) => {
                info!(
                    "Session {}: redirecting {} to {} (usage {})",
                    self.id,
                    self.viewer,
                    target.display_name(),
                    self.state.usage()
                );
                self.phase = Phase::Redirected(target);
                Step::Redirect(target)
            }
            GateDecision::Permit => {
                let cursor = match kind {
                    RequestKind::Initial => None,
                    RequestKind::LoadMore => self.state.cursor().cloned(),
                };
                self.phase = match kind {
                    RequestKind::Initial => Phase::LoadingInitial,
                    RequestKind::LoadMore => Phase::LoadingMore,
                };
                Step::Fetch(FetchTicket {
                    generation: self.generation,
                    kind,
                    cursor,
                    page_size: self.config.page_size(kind),
                    viewer: self.viewer.clone(),
                })
            }
        }
    }

    /// Finish a request started by `begin`
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedPage, FetchError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            info!(
                "Session {}: discarding {:?} result fetched for {} (viewer changed)",
                self.id, ticket.kind, ticket.viewer
            );
            return Completion::Stale;
        }

        match result {
            Ok(page) => {
                let appended = page.records.len();
                self.state.apply(ticket.kind, page);
                self.phase = Phase::Ready;
                Completion::Applied { appended }
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(
                        "Session {}: {:?} fetch failed, a later gesture may retry: {}",
                        self.id, ticket.kind, e
                    );
                } else {
                    error!("Session {}: {:?} fetch failed: {}", self.id, ticket.kind, e);
                }
                self.phase = match ticket.kind {
                    RequestKind::Initial => Phase::Idle,
                    RequestKind::LoadMore => Phase::Ready,
                };
                Completion::Failed(e)
            }
        }
    }

    /// Switch viewer. Members, cursor and usage reset together and any
    /// in-flight ticket goes stale. Returns false when the identity is unchanged.
    pub fn change_viewer(&mut self, viewer: Viewer) -> bool {
        if viewer == self.viewer {
            return false;
        }

        let previous = std::mem::replace(&mut self.viewer, viewer);
        self.generation += 1;
        self.state.reset();
        self.phase = Phase::Idle;
        self.id = Uuid::new_v4();

        info!(
            "Viewer changed from {} to {}; session reset as {}",
            previous, self.viewer, self.id
        );
        true
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        let is_fetching_more = self.phase == Phase::LoadingMore;
        DirectorySnapshot {
            loading: self.phase == Phase::LoadingInitial,
            is_fetching_more,
            members: self.state.members().to_vec(),
            can_load_more: self.state.can_load_more(),
            load_more_label: LoadMoreLabel::select(
                is_fetching_more,
                self.state.usage(),
                self.gate.member_allowance(),
            ),
            usage: self.state.usage(),
        }
    }
}
