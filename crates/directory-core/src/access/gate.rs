//! ============================================================================
//! Access Gate - Pure permit/redirect decision for page requests
//! ============================================================================
//! The gate holds no session state. Usage counts and viewer identity are
//! passed in on every call, so the same decision can be replayed in tests.
//! ============================================================================

use crate::types::{RequestKind, Viewer};

use super::types::{GateDecision, RedirectTarget};

/// Successful "load more" requests a member gets before being redirected
pub const DEFAULT_MEMBER_ALLOWANCE: u32 = 1;

/// Decides whether a page request may reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGate {
    member_allowance: u32,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_MEMBER_ALLOWANCE)
    }
}

impl AccessGate {
    pub fn new(member_allowance: u32) -> Self {
        Self { member_allowance }
    }

    pub fn member_allowance(&self) -> u32 {
        self.member_allowance
    }

    /// Map (request kind, viewer, usage) to permit-or-redirect. Total and side-effect free.
    pub fn decide(&self, kind: RequestKind, viewer: &Viewer, usage: u32) -> GateDecision {
        match (kind, viewer) {
            (RequestKind::Initial, _) => GateDecision::Permit,
            (RequestKind::LoadMore, Viewer::Anonymous) => {
                GateDecision::Redirect(RedirectTarget::AuthenticationSurface)
            }
            (RequestKind::LoadMore, Viewer::Authenticated { .. }) => {
                if self.allowance_spent(usage) {
                    GateDecision::Redirect(RedirectTarget::AlternateSearchSurface)
                } else {
                    GateDecision::Permit
                }
            }
        }
    }

    /// True once a member's next "load more" would be refused
    pub fn allowance_spent(&self, usage: u32) -> bool {
        usage >= self.member_allowance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_always_permitted() {
        let gate = AccessGate::default();
        for usage in [0, 1, 5] {
            assert_eq!(
                gate.decide(RequestKind::Initial, &Viewer::Anonymous, usage),
                GateDecision::Permit
            );
            assert_eq!(
                gate.decide(RequestKind::Initial, &Viewer::authenticated("u1"), usage),
                GateDecision::Permit
            );
        }
    }

    #[test]
    fn test_guest_load_more_goes_to_login() {
        let gate = AccessGate::default();
        for usage in [0, 1, 7] {
            assert_eq!(
                gate.decide(RequestKind::LoadMore, &Viewer::Anonymous, usage),
                GateDecision::Redirect(RedirectTarget::AuthenticationSurface)
            );
        }
    }

    #[test]
    fn test_member_gets_one_load_more() {
        let gate = AccessGate::default();
        let member = Viewer::authenticated("u1");

        assert!(gate.decide(RequestKind::LoadMore, &member, 0).is_permit());
        assert_eq!(
            gate.decide(RequestKind::LoadMore, &member, 1),
            GateDecision::Redirect(RedirectTarget::AlternateSearchSurface)
        );
        assert_eq!(
            gate.decide(RequestKind::LoadMore, &member, 2),
            GateDecision::Redirect(RedirectTarget::AlternateSearchSurface)
        );
    }

    #[test]
    fn test_custom_allowance() {
        let gate = AccessGate::new(3);
        let member = Viewer::authenticated("u1");

        assert!(gate.decide(RequestKind::LoadMore, &member, 2).is_permit());
        assert!(!gate.decide(RequestKind::LoadMore, &member, 3).is_permit());
        assert!(!gate.allowance_spent(2));
        assert!(gate.allowance_spent(3));
    }

    #[test]
    fn test_zero_allowance_redirects_members_immediately() {
        let gate = AccessGate::new(0);
        assert_eq!(
            gate.decide(RequestKind::LoadMore, &Viewer::authenticated("u1"), 0),
            GateDecision::Redirect(RedirectTarget::AlternateSearchSurface)
        );
    }
}
